//! Error types shared by the effect components.
//!
//! Decorative failures are contained per component: callers log them and fall
//! back to a static or empty surface instead of propagating further.

/// A component configuration failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A numeric field must be finite and at least zero.
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },

    /// A numeric field must be finite and strictly positive.
    #[error("{field} must be a finite, positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    /// A field is outside its allowed closed interval.
    #[error("{field} must lie within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A colour string was not `#rgb` or `#rrggbb`.
    #[error("invalid colour '{0}': expected #rgb or #rrggbb")]
    Color(String),

    /// A named preset does not exist for this component.
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// The JSON configuration attribute could not be decoded.
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// Binary glTF container could not be turned into a mesh.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlbError {
    #[error("asset is truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("bad magic number {0:#010x}, not a binary glTF file")]
    Magic(u32),

    #[error("unsupported glTF container version {0}")]
    Version(u32),

    #[error("expected {expected} chunk, found {found:#010x}")]
    Chunk { expected: &'static str, found: u32 },

    #[error("invalid glTF JSON: {0}")]
    Json(String),

    #[error("asset has no mesh primitive with POSITION data")]
    NoGeometry,

    #[error("accessor {index}: {reason}")]
    Accessor { index: usize, reason: String },
}

/// Umbrella error for mounting and running an effect.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("asset error: {0}")]
    Asset(#[from] GlbError),

    /// The rendering surface (canvas context, shader program) could not be
    /// created.
    #[error("rendering surface unavailable: {0}")]
    Surface(String),

    /// A DOM or browser API call failed.
    #[error("browser call failed: {0}")]
    Dom(String),

    /// Frame scheduling was refused by the host.
    #[error("could not schedule animation frame: {0}")]
    Schedule(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for FxError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        FxError::Dom(format!("{value:?}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<FxError> for wasm_bindgen::JsValue {
    fn from(err: FxError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GalleryError {
    #[error("image id {0} appears more than once in the catalog")]
    DuplicateId(u32),

    #[error("no gallery category named '{0}'")]
    UnknownCategory(String),
}

/// Rejected edits or submissions of a reservation form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("required field '{0}' is empty")]
    MissingField(&'static str),

    #[error("unknown form field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not a valid choice for {field}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("this form has no {0} field")]
    FieldNotPresent(&'static str),

    #[error("a submission is already in progress")]
    Busy,
}

/// Failure reported by a reservation backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("the reservation service is unavailable: {0}")]
    Unavailable(String),

    #[error("the reservation was declined: {0}")]
    Declined(String),
}
