//! Breathing radial gradient used behind the dining, experiences, travel and
//! gallery sections.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::anim::EASE;
use crate::config::{self, ComponentConfig};
use crate::error::ConfigError;

/// Colour stops from the centre outward: black, navy, deep blues, dark gold.
pub const GRADIENT_COLORS: [&str; 8] = [
    "#000000", "#1a1a2e", "#16213e", "#0f3460", "#533a00", "#664d00", "#1a1a2e", "#000000",
];
pub const GRADIENT_STOPS: [u8; 8] = [0, 15, 30, 45, 60, 75, 90, 100];

/// Fade-in applied to the gradient layer once when it mounts.
pub const ENTRANCE_MS: f64 = 1500.0;
const ENTRANCE_START_SCALE: f64 = 1.2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradientConfig {
    /// Base ellipse radius, in percent of the surface.
    pub starting_gap: f64,
    pub breathing: bool,
    /// Radius change per frame while breathing.
    pub animation_speed: f64,
    /// Half-width of the oscillation interval around `starting_gap`.
    pub breathing_range: f64,
    /// Extra vertical radius, in percent.
    pub top_offset: f64,
    /// Opacity of the whole layer once the entrance has finished.
    pub opacity: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            starting_gap: 130.0,
            breathing: true,
            animation_speed: 0.012,
            breathing_range: 10.0,
            top_offset: 0.0,
            opacity: 1.0,
        }
    }
}

impl GradientConfig {
    fn section(gap: f64, speed: f64, range: f64, top_offset: f64, opacity: f64) -> Self {
        Self {
            starting_gap: gap,
            breathing: true,
            animation_speed: speed,
            breathing_range: range,
            top_offset,
            opacity,
        }
    }

    pub fn lower_bound(&self) -> f64 {
        self.starting_gap - self.breathing_range
    }

    pub fn upper_bound(&self) -> f64 {
        self.starting_gap + self.breathing_range
    }
}

impl ComponentConfig for GradientConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        config::non_negative("startingGap", self.starting_gap)?;
        config::non_negative("animationSpeed", self.animation_speed)?;
        config::non_negative("breathingRange", self.breathing_range)?;
        config::finite("topOffset", self.top_offset)?;
        config::within("opacity", self.opacity, 0.0, 1.0)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "dining" => Ok(Self::section(115.0, 0.007, 9.0, 18.0, 0.55)),
            "experiences" => Ok(Self::section(120.0, 0.011, 11.0, 22.0, 0.58)),
            "travel" => Ok(Self::section(118.0, 0.009, 9.0, 19.0, 0.62)),
            "gallery" => Ok(Self::section(135.0, 0.008, 10.0, 25.0, 0.5)),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Shrinking,
    Still,
    Growing,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Shrinking => -1.0,
            Direction::Still => 0.0,
            Direction::Growing => 1.0,
        }
    }
}

/// Per-frame state of the breathing radius.
#[derive(Clone, Debug)]
pub struct GradientOscillator {
    config: GradientConfig,
    width: f64,
    direction: Direction,
}

impl GradientOscillator {
    /// Rejects configurations whose bounds are inverted or not finite.
    pub fn new(config: GradientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            width: config.starting_gap,
            direction: Direction::Growing,
            config,
        })
    }

    pub fn config(&self) -> &GradientConfig {
        &self.config
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Advances one frame and returns the new radius.
    ///
    /// The direction flips when the radius sits on either bound; the step is
    /// clamped so the radius never leaves `[gap - range, gap + range]`.
    pub fn step(&mut self) -> f64 {
        let (lower, upper) = (self.config.lower_bound(), self.config.upper_bound());
        if self.width >= upper {
            self.direction = Direction::Shrinking;
        }
        if self.width <= lower {
            self.direction = Direction::Growing;
        }
        if !self.config.breathing {
            self.direction = Direction::Still;
        }
        self.width = (self.width + self.direction.sign() * self.config.animation_speed).clamp(lower, upper);
        self.width
    }

    /// CSS background for the current radius.
    pub fn css(&self) -> String {
        radial_gradient(self.width, self.config.top_offset)
    }
}

/// Formats the fixed eight-stop palette as a CSS `radial-gradient` centred at
/// (50%, 30%).
pub fn radial_gradient(width: f64, top_offset: f64) -> String {
    let mut css = format!("radial-gradient({width}% {}% at 50% 30%", width + top_offset);
    for (color, stop) in GRADIENT_COLORS.iter().zip(GRADIENT_STOPS) {
        // Writing into a String cannot fail.
        let _ = write!(css, ", {color} {stop}%");
    }
    css.push(')');
    css
}

/// Opacity and scale of the layer during its mount fade-in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceFrame {
    pub opacity: f64,
    pub scale: f64,
    pub finished: bool,
}

pub fn entrance_at(elapsed_ms: f64, final_opacity: f64) -> EntranceFrame {
    let progress = EASE.apply(elapsed_ms / ENTRANCE_MS);
    EntranceFrame {
        opacity: final_opacity * progress,
        scale: ENTRANCE_START_SCALE + (1.0 - ENTRANCE_START_SCALE) * progress,
        finished: elapsed_ms >= ENTRANCE_MS,
    }
}
