//! Rotating 3D emblem shown in the hero section.
//!
//! The emblem asset loads asynchronously. Until it arrives, or if it never
//! does, a gold placeholder cube spins in its place. Rotation is scaled by the
//! frame delta so the angular rate does not depend on the display refresh.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{self, ComponentConfig, Rgb};
use crate::error::{ConfigError, GlbError};

/// Yaw rate of the emblem and the placeholder, radians per second.
pub const SPIN_Y: f32 = 0.5;
/// Extra pitch rate applied only to the placeholder cube.
pub const PLACEHOLDER_SPIN_X: f32 = 0.2;
/// Frame deltas above this are clamped, so a backgrounded tab does not jump.
pub const MAX_FRAME_DELTA: f32 = 0.1;

pub const CAMERA_EYE: Vec3 = Vec3::new(0.0, 0.0, 6.0);
pub const CAMERA_FOV_DEGREES: f32 = 50.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmblemConfig {
    /// URL of the binary glTF asset. Empty means placeholder only.
    pub model_path: String,
    pub position: [f32; 3],
    /// Initial Euler rotation (XYZ order), radians.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub auto_rotate: bool,
}

impl Default for EmblemConfig {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            auto_rotate: true,
        }
    }
}

impl ComponentConfig for EmblemConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for value in self.position {
            config::finite("position", value.into())?;
        }
        for value in self.rotation {
            config::finite("rotation", value.into())?;
        }
        for value in self.scale {
            config::positive("scale", value.into())?;
        }
        Ok(())
    }

    fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "hero" => Ok(Self {
                model_path: "/models/Gold_Initials_1013141911_texture.glb".into(),
                scale: [2.2; 3],
                ..Self::default()
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub base_color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn placeholder() -> Self {
        Self {
            base_color: Rgb::from_u8(0xff, 0xd7, 0x00),
            metalness: 0.9,
            roughness: 0.1,
            emissive: Rgb::from_u8(0xff, 0xaa, 0x00),
            emissive_intensity: 0.2,
        }
    }

    /// Material for assets that do not declare one.
    pub fn model_default() -> Self {
        Self {
            base_color: Rgb::from_u8(0xff, 0xff, 0xff),
            metalness: 0.0,
            roughness: 1.0,
            emissive: Rgb::from_u8(0, 0, 0),
            emissive_intensity: 0.0,
        }
    }
}

/// Scene lighting, matching the hero canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub directional_dir: Vec3,
    pub directional: f32,
    pub point_position: Vec3,
    pub point_color: Rgb,
    pub point: f32,
    /// Spot light aimed at the origin.
    pub spot_position: Vec3,
    pub spot_color: Rgb,
    pub spot: f32,
    /// Half-angle of the cone, radians.
    pub spot_angle: f32,
    /// Fraction of the cone over which the edge softens.
    pub spot_penumbra: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 2.0,
            directional_dir: Vec3::new(5.0, 5.0, 5.0).normalize(),
            directional: 3.0,
            point_position: Vec3::new(2.0, 2.0, 2.0),
            point_color: Rgb::from_u8(0xff, 0xd7, 0x00),
            point: 2.0,
            spot_position: Vec3::new(0.0, 5.0, 0.0),
            spot_color: Rgb::from_u8(0xff, 0xaa, 0x00),
            spot: 2.0,
            spot_angle: std::f32::consts::FRAC_PI_4,
            spot_penumbra: 0.5,
        }
    }
}

impl Lighting {
    /// Cosines bounding the spot's soft edge: (outer, inner).
    pub fn spot_cone(&self) -> (f32, f32) {
        (
            self.spot_angle.cos(),
            (self.spot_angle * (1.0 - self.spot_penumbra)).cos(),
        )
    }

    /// Spot cone factor in `[0, 1]` for a point in world space: 1 inside the
    /// inner cone, 0 outside the outer cone.
    pub fn spot_attenuation(&self, world: Vec3) -> f32 {
        let axis = (-self.spot_position).normalize_or_zero();
        let Some(ray) = (world - self.spot_position).try_normalize() else {
            return 1.0;
        };
        let (outer, inner) = self.spot_cone();
        let t = ((axis.dot(ray) - outer) / (inner - outer)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// Indexed triangle mesh ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct EmblemMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl EmblemMesh {
    /// Axis-aligned cube of edge `size` centred on the origin, one quad per
    /// face so each face gets its own normal.
    pub fn cube(size: f32, material: Material) -> Self {
        let h = size * 0.5;
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([1.0, 0.0, 0.0], [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]]),
            ([-1.0, 0.0, 0.0], [[-h, -h, h], [-h, h, h], [-h, h, -h], [-h, -h, -h]]),
            ([0.0, 1.0, 0.0], [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]]),
            ([0.0, -1.0, 0.0], [[-h, -h, h], [-h, -h, -h], [h, -h, -h], [h, -h, h]]),
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = positions.len() as u32;
            positions.extend(corners);
            normals.extend([normal; 4]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            positions,
            normals,
            indices,
            material,
        }
    }

    pub fn placeholder() -> Self {
        Self::cube(2.0, Material::placeholder())
    }

    /// Un-indexes `indices` and assigns each triangle its face normal.
    pub fn flat_shaded(positions: &[[f32; 3]], indices: &[u32], material: Material) -> Self {
        let mut out_positions = Vec::with_capacity(indices.len());
        let mut out_normals = Vec::with_capacity(indices.len());
        for tri in indices.chunks_exact(3) {
            let corners = [0, 1, 2].map(|k| Vec3::from_array(positions[tri[k] as usize]));
            let normal = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .try_normalize()
                .unwrap_or(Vec3::Z);
            for corner in corners {
                out_positions.push(corner.to_array());
                out_normals.push(normal.to_array());
            }
        }
        let count = out_positions.len() as u32;
        Self {
            positions: out_positions,
            normals: out_normals,
            indices: (0..count).collect(),
            material,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EmblemLoad {
    Loading,
    Loaded(EmblemMesh),
    Failed(String),
}

/// Identifies one load attempt; results for stale tickets are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Clone, Debug)]
pub struct Emblem {
    config: EmblemConfig,
    load: EmblemLoad,
    spin: Vec3,
    generation: u64,
    torn_down: bool,
}

impl Emblem {
    pub fn new(config: EmblemConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            load: EmblemLoad::Loading,
            spin: Vec3::ZERO,
            generation: 0,
            torn_down: false,
        })
    }

    pub fn config(&self) -> &EmblemConfig {
        &self.config
    }

    pub fn load_state(&self) -> &EmblemLoad {
        &self.load
    }

    pub fn showing_placeholder(&self) -> bool {
        !matches!(self.load, EmblemLoad::Loaded(_))
    }

    /// Starts a new load attempt, invalidating any earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load = EmblemLoad::Loading;
        LoadTicket(self.generation)
    }

    /// Applies a load result. Returns false when the result was discarded
    /// because the emblem was torn down or a newer load superseded it.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<EmblemMesh, GlbError>) -> bool {
        if self.torn_down || ticket.0 != self.generation {
            return false;
        }
        self.load = match result {
            Ok(mesh) => {
                self.spin = Vec3::ZERO;
                EmblemLoad::Loaded(mesh)
            }
            Err(err) => {
                log::warn!("emblem asset unavailable, keeping placeholder: {err}");
                EmblemLoad::Failed(err.to_string())
            }
        };
        true
    }

    /// Like [`finish_load`](Self::finish_load) for failures that happen
    /// before parsing (network, HTTP status).
    pub fn fail_load(&mut self, ticket: LoadTicket, reason: impl Into<String>) -> bool {
        if self.torn_down || ticket.0 != self.generation {
            return false;
        }
        let reason = reason.into();
        log::warn!("emblem asset unavailable, keeping placeholder: {reason}");
        self.load = EmblemLoad::Failed(reason);
        true
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.generation += 1;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Advances rotation by a frame delta in seconds.
    pub fn tick(&mut self, delta_seconds: f32) {
        if !self.config.auto_rotate || self.torn_down {
            return;
        }
        let dt = delta_seconds.clamp(0.0, MAX_FRAME_DELTA);
        self.spin.y += SPIN_Y * dt;
        if self.showing_placeholder() {
            self.spin.x += PLACEHOLDER_SPIN_X * dt;
        }
    }

    /// Current Euler rotation: configured orientation plus accumulated spin.
    pub fn rotation(&self) -> Vec3 {
        Vec3::from_array(self.config.rotation) + self.spin
    }

    pub fn model_matrix(&self) -> Mat4 {
        let r = self.rotation();
        Mat4::from_scale_rotation_translation(
            Vec3::from_array(self.config.scale),
            Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            Vec3::from_array(self.config.position),
        )
    }

    pub fn view_projection(aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh_gl(CAMERA_FOV_DEGREES.to_radians(), aspect.max(1e-3), 0.1, 100.0);
        let view = Mat4::look_at_rh(CAMERA_EYE, Vec3::ZERO, Vec3::Y);
        projection * view
    }
}
