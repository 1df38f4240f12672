//! Scene → GPU buffers, in one synchronous pass.

mod slot;

pub use slot::{BuildTicket, SceneSlot};

use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::bvh::{build_bvh_with, serialize_bvh, SerializedBvh, TreeStats};
use crate::config::BuildConfig;
use crate::gpu::{encode_materials, encode_triangles, FlatBuffer};
use crate::scene::{CameraUniform, Scene};
use crate::util::Result;

/// Per-scene constants for uniform upload (80 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct SceneUniforms {
    pub triangle_count: u32,
    pub material_count: u32,
    /// Texels in the BVH addressing table
    pub bvh_table_texels: u32,
    pub _pad: u32,
    pub camera: CameraUniform,
}

/// Everything the tracer uploads for one scene.
#[derive(Debug, Clone)]
pub struct SceneBuffers {
    pub triangles: FlatBuffer,
    pub materials: FlatBuffer,
    pub bvh: SerializedBvh,
    pub uniforms: SceneUniforms,
    pub stats: TreeStats,
}

/// Build the BVH and encode all three buffers.
///
/// Fails without partial output if any buffer exceeds its capacity.
#[tracing::instrument(skip_all, fields(triangles = scene.triangles.len()))]
pub fn build_scene_buffers(scene: &Scene, config: &BuildConfig) -> Result<SceneBuffers> {
    let start = Instant::now();

    let triangles = encode_triangles(&scene.triangles, config.layout)?;
    let materials = encode_materials(&scene.materials, config.layout)?;

    let tree = build_bvh_with(&scene.primitives(), config.costs);
    let stats = tree.stats();
    let bvh = serialize_bvh(&tree, config.layout)?;

    let uniforms = SceneUniforms {
        triangle_count: scene.triangles.len() as u32,
        material_count: scene.materials.len() as u32,
        bvh_table_texels: bvh.table_texels as u32,
        _pad: 0,
        camera: scene.camera.to_uniform(),
    };

    tracing::debug!(
        nodes = stats.node_count,
        leaves = stats.leaf_count,
        depth = stats.depth,
        bvh_scalars = bvh.buffer.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "scene buffers built"
    );

    Ok(SceneBuffers {
        triangles,
        materials,
        bvh,
        uniforms,
        stats,
    })
}
