//! Pointer-reactive ripple grid behind the rooms section.
//!
//! The browser renders this with a fragment shader; [`RippleField::shade`] is
//! the same function evaluated on the CPU so output can be checked without a
//! GPU.

use std::f32::consts::PI;

use glam::{Mat2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::anim::approach;
use crate::config::{self, ComponentConfig, Rgb};
use crate::error::ConfigError;

/// Per-frame smoothing of the rendered pointer toward the real pointer.
pub const POINTER_LERP: f32 = 0.1;
/// Per-frame smoothing of pointer influence on enter/leave.
pub const INFLUENCE_LERP: f32 = 0.05;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RippleGridConfig {
    pub enable_rainbow: bool,
    pub grid_color: Rgb,
    pub ripple_intensity: f32,
    pub grid_size: f32,
    pub grid_thickness: f32,
    pub fade_distance: f32,
    pub vignette_strength: f32,
    pub glow_intensity: f32,
    pub opacity: f32,
    /// Grid rotation in degrees.
    pub grid_rotation: f32,
    pub mouse_interaction: bool,
    /// Pointer reach as a fraction of the surface.
    pub mouse_interaction_radius: f32,
}

impl Default for RippleGridConfig {
    fn default() -> Self {
        Self {
            enable_rainbow: false,
            grid_color: Rgb::from_u8(0xff, 0xff, 0xff),
            ripple_intensity: 0.05,
            grid_size: 10.0,
            grid_thickness: 15.0,
            fade_distance: 1.5,
            vignette_strength: 2.0,
            glow_intensity: 0.1,
            opacity: 1.0,
            grid_rotation: 0.0,
            mouse_interaction: true,
            mouse_interaction_radius: 1.0,
        }
    }
}

impl ComponentConfig for RippleGridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        config::non_negative("rippleIntensity", self.ripple_intensity.into())?;
        config::positive("gridSize", self.grid_size.into())?;
        config::non_negative("gridThickness", self.grid_thickness.into())?;
        config::positive("fadeDistance", self.fade_distance.into())?;
        config::non_negative("vignetteStrength", self.vignette_strength.into())?;
        config::non_negative("glowIntensity", self.glow_intensity.into())?;
        config::within("opacity", self.opacity.into(), 0.0, 1.0)?;
        config::finite("gridRotation", self.grid_rotation.into())?;
        config::positive("mouseInteractionRadius", self.mouse_interaction_radius.into())?;
        config::within("mouseInteractionRadius", self.mouse_interaction_radius.into(), 0.0, 1.0)
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "rooms" => Ok(Self {
                grid_color: Rgb::from_u8(0x3a, 0x3a, 0x6a),
                ripple_intensity: 0.08,
                grid_size: 12.0,
                grid_thickness: 6.0,
                mouse_interaction_radius: 0.8,
                glow_intensity: 0.25,
                fade_distance: 10.0,
                vignette_strength: 0.0,
                ..Self::default()
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

/// Smoothed pointer state, in surface-normalised coordinates (y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub influence: f32,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vec2::splat(0.5),
            influence: 0.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    target: Vec2,
    inside: bool,
    state: PointerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            target: Vec2::splat(0.5),
            ..Self::default()
        }
    }

    /// Records a pointer position in CSS pixels relative to a `width`×`height`
    /// surface.
    pub fn moved(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.target = Vec2::new(x / width, 1.0 - y / height);
    }

    pub fn entered(&mut self) {
        self.inside = true;
    }

    pub fn left(&mut self) {
        self.inside = false;
    }

    /// Applies one frame of smoothing and returns the state to render with.
    pub fn advance(&mut self) -> PointerState {
        self.state.position = self.state.position.lerp(self.target, POINTER_LERP);
        let goal = if self.inside { 1.0 } else { 0.0 };
        self.state.influence = approach(self.state.influence, goal, INFLUENCE_LERP);
        self.state
    }

    pub fn state(&self) -> PointerState {
        self.state
    }
}

/// Everything the shader needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleUniforms {
    pub time: f32,
    pub resolution: Vec2,
    pub pointer: PointerState,
}

/// Ripple grid animation state: configuration plus the pointer tracker.
#[derive(Clone, Debug)]
pub struct RippleGrid {
    field: RippleField,
    pointer: PointerTracker,
}

impl RippleGrid {
    pub fn new(config: RippleGridConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            field: RippleField::new(config)?,
            pointer: PointerTracker::new(),
        })
    }

    pub fn field(&self) -> &RippleField {
        &self.field
    }

    pub fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    /// Uniforms for the frame at `timestamp_ms` on a surface of `resolution`
    /// device pixels.
    pub fn frame(&mut self, timestamp_ms: f64, resolution: Vec2) -> RippleUniforms {
        let pointer = if self.field.config.mouse_interaction {
            self.pointer.advance()
        } else {
            PointerState::default()
        };
        RippleUniforms {
            time: (timestamp_ms * 0.001) as f32,
            resolution,
            pointer,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RippleField {
    config: RippleGridConfig,
    rotation: Mat2,
}

impl RippleField {
    pub fn new(config: RippleGridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rotation = Mat2::from_angle(config.grid_rotation.to_radians());
        Ok(Self { config, rotation })
    }

    pub fn config(&self) -> &RippleGridConfig {
        &self.config
    }

    /// Premultiplied RGBA for texture coordinate `uv` in `[0, 1]²`.
    pub fn shade(&self, uv: Vec2, uniforms: &RippleUniforms) -> [f32; 4] {
        let c = &self.config;
        let aspect = if uniforms.resolution.y > 0.0 {
            uniforms.resolution.x / uniforms.resolution.y
        } else {
            1.0
        };
        let time = uniforms.time;

        let mut p = uv * 2.0 - Vec2::ONE;
        p.x *= aspect;
        if c.grid_rotation != 0.0 {
            p = self.rotation * p;
        }

        let dist = p.length();
        let wave = (PI * (time - dist)).sin();
        let mut ripple = p + p * wave * c.ripple_intensity;

        let pointer = uniforms.pointer;
        if c.mouse_interaction && pointer.influence > 0.0 {
            let mut mouse = pointer.position * 2.0 - Vec2::ONE;
            mouse.x *= aspect;
            let offset = p - mouse;
            let mouse_dist = offset.length();
            let radius = c.mouse_interaction_radius;
            let influence = pointer.influence * (-(mouse_dist * mouse_dist) / (radius * radius)).exp();
            let mouse_wave = (PI * (time * 2.0 - mouse_dist * 3.0)).sin() * influence;
            if mouse_dist > 1e-5 {
                ripple += offset / mouse_dist * mouse_wave * c.ripple_intensity * 0.3;
            }
        }

        let line = |v: f32| {
            let a = (c.grid_size * 0.5 * PI * v - PI / 2.0).sin().abs();
            smoothstep(0.0, 0.5, a)
        };
        let (bx, by) = (line(ripple.x), line(ripple.y));

        let t = c.grid_thickness;
        let mut intensity = (-t * bx * (0.8 + 0.5 * (PI * time).sin())).exp();
        intensity += (-t * by).exp();
        intensity += 0.5 * (-(t / 4.0) * bx.sin()).exp();
        intensity += 0.5 * (-(t / 3.0) * by).exp();
        if c.glow_intensity > 0.0 {
            intensity += c.glow_intensity * (-t * 0.5 * bx).exp();
            intensity += c.glow_intensity * (-t * 0.5 * by).exp();
        }
        let color = Vec3::splat(intensity);

        let fade = (-2.0 * dist.powf(c.fade_distance).clamp(0.0, 1.0)).exp();
        let vignette = vignette(uv, c.vignette_strength);

        let tint = if c.enable_rainbow {
            Vec3::new(
                p.x * 0.5 + 0.5 * time.sin(),
                p.y * 0.5 + 0.5 * time.cos(),
                time.cos().powi(4),
            ) + Vec3::splat(0.5)
        } else {
            Vec3::from_array(c.grid_color.to_array())
        };

        let final_fade = fade * vignette * c.opacity;
        let rgb = color * tint * final_fade;
        let alpha = (color.length() * final_fade).min(1.0);
        [rgb.x, rgb.y, rgb.z, alpha]
    }
}

/// Radial vignette factor; a strength of zero disables the vignette.
pub fn vignette(uv: Vec2, strength: f32) -> f32 {
    if strength <= 0.0 {
        return 1.0;
    }
    let d = (uv - Vec2::splat(0.5)).length();
    (1.0 - (d * 2.0).powf(strength)).clamp(0.0, 1.0)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
