//! Scroll-driven section motion: parallax offsets that follow scroll progress
//! and a one-shot reveal played the first time a section enters view.

use serde::{Deserialize, Serialize};

use crate::anim::EASE;
use crate::config::{self, ComponentConfig};
use crate::error::ConfigError;

/// What a parallax host measures its progress against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tracking {
    /// Whole-document scroll, 0 at the top and 1 at the bottom.
    Page,
    /// 0 when the host's top meets the viewport bottom, 1 when its bottom
    /// leaves the viewport top.
    Section,
}

/// Piecewise-linear map from progress to a value. Stops are
/// `[progress, value]` pairs in increasing progress; outside the first and
/// last stop the end values hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyframes(pub Vec<[f64; 2]>);

impl Keyframes {
    pub fn constant(value: f64) -> Self {
        Self(vec![[0.0, value]])
    }

    pub fn linear(from: f64, to: f64) -> Self {
        Self(vec![[0.0, from], [1.0, to]])
    }

    pub fn sample(&self, progress: f64) -> f64 {
        let stops = &self.0;
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return 0.0;
        };
        if progress <= first[0] {
            return first[1];
        }
        if progress >= last[0] {
            return last[1];
        }
        for pair in stops.windows(2) {
            let ([p0, v0], [p1, v1]) = (pair[0], pair[1]);
            if progress <= p1 {
                if p1 <= p0 {
                    return v1;
                }
                return v0 + (v1 - v0) * (progress - p0) / (p1 - p0);
            }
        }
        last[1]
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::Malformed(format!("{field} needs at least one stop")));
        }
        for [progress, value] in &self.0 {
            config::finite(field, *progress)?;
            config::finite(field, *value)?;
        }
        if self.0.windows(2).any(|pair| pair[1][0] < pair[0][0]) {
            return Err(ConfigError::Malformed(format!("{field} stops must be in increasing order")));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxConfig {
    pub tracking: Tracking,
    /// Vertical offset in percent of the host's own height.
    pub translate_y: Keyframes,
    pub opacity: Keyframes,
    pub scale: Keyframes,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            tracking: Tracking::Section,
            translate_y: Keyframes::constant(0.0),
            opacity: Keyframes::constant(1.0),
            scale: Keyframes::constant(1.0),
        }
    }
}

fn fade_through() -> Keyframes {
    Keyframes(vec![[0.0, 0.0], [0.3, 1.0], [0.7, 1.0], [1.0, 0.0]])
}

impl ComponentConfig for ParallaxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.translate_y.validate("translateY")?;
        self.opacity.validate("opacity")?;
        self.scale.validate("scale")?;
        if self.opacity.0.iter().any(|[_, v]| !(0.0..=1.0).contains(v)) {
            return Err(ConfigError::Malformed("opacity stops must lie within [0, 1]".into()));
        }
        for [_, value] in &self.scale.0 {
            config::non_negative("scale", *value)?;
        }
        Ok(())
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            // Hero copy drifts down and fades out over the first half of the page.
            "hero" => Ok(Self {
                tracking: Tracking::Page,
                translate_y: Keyframes::linear(0.0, 50.0),
                opacity: Keyframes(vec![[0.0, 1.0], [0.5, 0.0]]),
                ..Self::default()
            }),
            "about" => Ok(Self {
                translate_y: Keyframes::linear(0.0, -50.0),
                opacity: fade_through(),
                scale: Keyframes(vec![[0.0, 0.8], [0.3, 1.0], [0.7, 1.0], [1.0, 0.8]]),
                ..Self::default()
            }),
            "dining" => Ok(Self {
                translate_y: Keyframes::linear(0.0, -20.0),
                opacity: fade_through(),
                ..Self::default()
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Document scroll progress; 0 when the page does not scroll.
pub fn page_progress(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> f64 {
    let range = scroll_height - viewport_height;
    if range <= 0.0 {
        return 0.0;
    }
    (scroll_top / range).clamp(0.0, 1.0)
}

/// Progress of a section whose bounding box starts `top` pixels below the
/// viewport top and is `height` pixels tall.
pub fn section_progress(top: f64, height: f64, viewport_height: f64) -> f64 {
    let travel = viewport_height + height.max(0.0);
    if travel <= 0.0 {
        return 0.0;
    }
    ((viewport_height - top) / travel).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallaxFrame {
    pub translate_y: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl ParallaxFrame {
    pub fn transform(&self) -> String {
        format!("translate3d(0, {:.3}%, 0) scale({:.4})", self.translate_y, self.scale)
    }
}

#[derive(Clone, Debug)]
pub struct Parallax {
    config: ParallaxConfig,
}

impl Parallax {
    pub fn new(config: ParallaxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn tracking(&self) -> Tracking {
        self.config.tracking
    }

    pub fn frame(&self, progress: f64) -> ParallaxFrame {
        let progress = progress.clamp(0.0, 1.0);
        ParallaxFrame {
            translate_y: self.config.translate_y.sample(progress),
            opacity: self.config.opacity.sample(progress),
            scale: self.config.scale.sample(progress),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevealConfig {
    /// The viewport is shrunk by this many pixels on every side before the
    /// host counts as in view.
    pub margin: f64,
    pub duration_ms: f64,
    pub delay_ms: f64,
    /// Starting offset in CSS pixels.
    pub offset_x: f64,
    pub offset_y: f64,
    pub initial_scale: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            margin: 100.0,
            duration_ms: 800.0,
            delay_ms: 0.0,
            offset_x: 0.0,
            offset_y: 50.0,
            initial_scale: 1.0,
        }
    }
}

impl ComponentConfig for RevealConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        config::finite("margin", self.margin)?;
        config::non_negative("durationMs", self.duration_ms)?;
        config::non_negative("delayMs", self.delay_ms)?;
        config::finite("offsetX", self.offset_x)?;
        config::finite("offsetY", self.offset_y)?;
        config::non_negative("initialScale", self.initial_scale)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" | "heading" => Ok(Self::default()),
            "card" => Ok(Self {
                duration_ms: 600.0,
                offset_y: 30.0,
                ..Self::default()
            }),
            "slide" => Ok(Self {
                duration_ms: 600.0,
                offset_x: -50.0,
                offset_y: 0.0,
                ..Self::default()
            }),
            "badge" => Ok(Self {
                duration_ms: 600.0,
                delay_ms: 200.0,
                offset_y: 0.0,
                initial_scale: 0.8,
                ..Self::default()
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealFrame {
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    pub finished: bool,
}

impl RevealFrame {
    pub fn transform(&self) -> String {
        format!(
            "translate3d({:.2}px, {:.2}px, 0) scale({:.4})",
            self.offset_x, self.offset_y, self.scale
        )
    }
}

/// Latches the first time its host comes into view and then plays the
/// entrance once. Later scrolling never hides it again.
#[derive(Clone, Debug)]
pub struct Reveal {
    config: RevealConfig,
    revealed_at: Option<f64>,
}

impl Reveal {
    pub fn new(config: RevealConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            revealed_at: None,
        })
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    /// Feeds the host's vertical extent relative to the viewport top.
    /// Returns true only on the call that first sees it in view.
    pub fn observe(&mut self, top: f64, bottom: f64, viewport_height: f64, now_ms: f64) -> bool {
        if self.revealed_at.is_some() {
            return false;
        }
        let margin = self.config.margin;
        let in_view = top < viewport_height - margin && bottom > margin;
        if in_view {
            self.revealed_at = Some(now_ms);
        }
        in_view
    }

    /// The hidden pose until revealed, then the eased entrance.
    pub fn frame(&self, now_ms: f64) -> RevealFrame {
        let c = &self.config;
        let progress = match self.revealed_at {
            None => 0.0,
            Some(at) if c.duration_ms <= 0.0 => {
                if now_ms - at >= c.delay_ms {
                    1.0
                } else {
                    0.0
                }
            }
            Some(at) => ((now_ms - at - c.delay_ms) / c.duration_ms).clamp(0.0, 1.0),
        };
        let eased = EASE.apply(progress);
        let remaining = 1.0 - eased;
        RevealFrame {
            opacity: eased,
            offset_x: c.offset_x * remaining,
            offset_y: c.offset_y * remaining,
            scale: c.initial_scale + (1.0 - c.initial_scale) * eased,
            finished: progress >= 1.0,
        }
    }
}
