//! Flat numeric buffers consumed by the GPU tracer.
//!
//! Every buffer is logically a `width x height` RGBA32F texture; see
//! [`encode`] for the triangle and material record layouts and
//! [`crate::bvh`] for the BVH layout.

pub mod encode;
mod flat_buffer;

pub use encode::{
    decode_material, decode_triangle, encode_materials, encode_triangles, MaterialRecord,
    MATERIAL_STRIDE, NO_RANGE, TRIANGLE_STRIDE,
};
pub use flat_buffer::{BufferLayout, FlatBuffer, MAX_EXACT_INDEX, TEXEL};
