//! Bounding volume hierarchy: SAH construction, flat serialization and the
//! matching decoder.
//!
//! ## Architecture
//! ```text
//! &[Primitive] → build_bvh (SAH, recursive) → BvhNode → serialize_bvh → FlatBuffer
//!                                                                  ↓
//!                                                  decode_bvh (GPU traversal mirror)
//! ```

mod build;
mod decode;
mod node;
mod serialize;

pub use build::{
    build_bvh, build_bvh_with, find_best_split, SahCosts, SplitChoice, COST_AABB, COST_TRIANGLE,
};
pub use decode::decode_bvh;
pub use node::{left_child, right_child, BvhNode, TreeStats};
pub use serialize::{
    serialize_bvh, SerializedBvh, NODE_HEADER, NODE_TYPE_INTERNAL, NODE_TYPE_LEAF,
};
