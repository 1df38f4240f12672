//! Scene model handed to the BVH builder and the encoders.
//!
//! Loaders (the JSON [`SceneDescription`] or direct [`SceneBuilder`] calls)
//! produce a [`Scene`]: triangles with dense ids, the material table with
//! resolved footprints, and the camera.

mod builder;
mod camera;
mod description;
mod material;
mod normals;
mod triangle;

pub use builder::{MeshDesc, SceneBuilder, DEFAULT_SMOOTH_ANGLE};
pub use camera::{Camera, CameraUniform};
pub use description::{RawShape, SceneDescription};
pub use material::{Material, MaterialDesc, MaterialTable};
pub use normals::smooth_corner_normals;
pub use triangle::{Primitive, Triangle};

use crate::util::Aabb;

/// Everything the core needs from a loaded scene.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Indexed by id
    pub triangles: Vec<Triangle>,
    pub materials: MaterialTable,
    pub camera: Camera,
}

impl Scene {
    /// BVH build input, one primitive per triangle.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.triangles.iter().map(Triangle::primitive).collect()
    }

    pub fn bounds(&self) -> Aabb {
        self.triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, t| acc.union(t.primitive().aabb()))
    }
}
