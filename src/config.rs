//! Shared configuration plumbing for effect components.
//!
//! Each component has a plain parameter record with defaults, a set of named
//! section presets, and a `validate` step. In the browser a host element picks
//! a preset with `data-fx-preset` and may override individual fields with a
//! JSON object in `data-fx-config` (camelCase keys).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

pub trait ComponentConfig: Sized + Default + Serialize + DeserializeOwned {
    fn validate(&self) -> Result<(), ConfigError>;

    /// Looks up a named section preset.
    fn preset(name: &str) -> Result<Self, ConfigError>;

    /// Builds a validated configuration from an optional preset name and an
    /// optional JSON object of field overrides.
    fn resolve(preset: Option<&str>, overrides: Option<&str>) -> Result<Self, ConfigError> {
        let base = match preset {
            Some(name) => Self::preset(name)?,
            None => Self::default(),
        };
        let config = match overrides {
            Some(json) if !json.trim().is_empty() => apply_overrides(&base, json)?,
            _ => base,
        };
        config.validate()?;
        Ok(config)
    }
}

fn apply_overrides<C: Serialize + DeserializeOwned>(base: &C, json: &str) -> Result<C, ConfigError> {
    let malformed = |err: serde_json::Error| ConfigError::Malformed(err.to_string());

    let mut merged = serde_json::to_value(base).map_err(malformed)?;
    let patch: Value = serde_json::from_str(json).map_err(malformed)?;
    match (&mut merged, patch) {
        (Value::Object(fields), Value::Object(patch)) => fields.extend(patch),
        _ => return Err(ConfigError::Malformed("expected a JSON object".into())),
    }
    serde_json::from_value(merged).map_err(malformed)
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field })
    }
}

/// Linear RGB triple in `[0, 1]`, written as a CSS hex colour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::Color(text.to_string());
        let hex = text.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(bad());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::from_u8(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::from_u8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(bad()),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}
