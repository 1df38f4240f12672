//! Camera parameters passed through to the GPU tracer.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::util::Vec3;

/// Pinhole camera. The core never interprets it, only packs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub up: Vec3,
    pub direction: Vec3,
    /// Distance from the eye to the virtual screen plane
    pub screen_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            up: Vec3::Y,
            direction: Vec3::NEG_Z,
            screen_distance: 1.0,
        }
    }
}

/// Camera block for uniform upload (64 bytes, vec4 packed).
///
/// - `position_distance`: xyz = position, w = screen distance
/// - `up`: xyz = up, w = 0
/// - `direction`: xyz = view direction, w = 0
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct CameraUniform {
    pub position_distance: [f32; 4],
    pub up: [f32; 4],
    pub direction: [f32; 4],
    pub _pad: [f32; 4],
}

impl Camera {
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            position_distance: self.position.extend(self.screen_distance).to_array(),
            up: self.up.extend(0.0).to_array(),
            direction: self.direction.extend(0.0).to_array(),
            _pad: [0.0; 4],
        }
    }
}
