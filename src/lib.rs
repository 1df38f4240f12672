//! # ptscene
//!
//! Scene preparation for a GPU path tracer: builds a surface-area-heuristic
//! BVH over triangle primitives and packs triangles, materials and the tree
//! into flat `f32` buffers sized as RGBA32F textures.
//!
//! ## Modules
//!
//! - [`util`] - Math helpers (`Aabb`) and errors
//! - [`scene`] - Triangles, materials, camera, scene assembly and JSON loading
//! - [`bvh`] - SAH builder, heap-addressed serializer and decoder
//! - [`gpu`] - Flat buffers and triangle/material record encoding
//! - [`config`] - Persistent build configuration
//! - [`pipeline`] - One-shot scene → buffers build and the stale-build guard
//!
//! ## Example
//!
//! ```ignore
//! use ptscene::prelude::*;
//!
//! let config = BuildConfig::load();
//! let scene = SceneDescription::load("scene.json")?.into_scene(&config)?;
//! let buffers = build_scene_buffers(&scene, &config)?;
//! upload(buffers.bvh.buffer.to_texture());
//! ```

pub mod util;
pub mod scene;
pub mod bvh;
pub mod gpu;
pub mod config;
pub mod pipeline;

// Re-export commonly used types
pub use util::{Aabb, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bvh::{build_bvh, decode_bvh, serialize_bvh, BvhNode, SahCosts};
    pub use crate::config::BuildConfig;
    pub use crate::gpu::{BufferLayout, FlatBuffer};
    pub use crate::pipeline::{build_scene_buffers, SceneBuffers, SceneSlot};
    pub use crate::scene::{
        Camera, MaterialDesc, MeshDesc, Primitive, Scene, SceneBuilder, SceneDescription, Triangle,
    };
    pub use crate::util::{Aabb, Error, Result, Vec3};
}
