//! Serialize a BVH into the tracer's flat buffer.
//!
//! Two regions share one buffer:
//!
//! ```text
//! [ addressing table: one texel per heap position ][ body: node records ]
//! ```
//!
//! Table texel `p` holds, in its first scalar, the texel index of the record
//! of the node at heap position `p` (root 0, children `2p+1` / `2p+2`).
//! Body records are written in pre-order:
//!
//! ```text
//! texel 0: min.x min.y min.z type   (0 = node, 1 = leaf)
//! texel 1: max.x max.y max.z count  (count = 0 for nodes)
//! leaf only, one texel per triangle: id 0 0 0
//! ```

use super::node::{left_child, right_child, BvhNode};
use crate::gpu::{BufferLayout, FlatBuffer, MAX_EXACT_INDEX, TEXEL};
use crate::util::{Error, Result};

/// Record type tag of an internal node.
pub const NODE_TYPE_INTERNAL: f32 = 0.0;

/// Record type tag of a leaf.
pub const NODE_TYPE_LEAF: f32 = 1.0;

/// Scalars in a node header (two texels).
pub const NODE_HEADER: usize = 2 * TEXEL;

/// Serialized tree plus the size of its addressing table.
#[derive(Debug, Clone)]
pub struct SerializedBvh {
    pub buffer: FlatBuffer,
    /// Texels in the addressing table; the body starts right after
    pub table_texels: usize,
    /// Texels used by node records
    pub body_texels: usize,
}

/// Lay out `root` into a buffer of `layout` capacity.
#[tracing::instrument(skip_all)]
pub fn serialize_bvh(root: &BvhNode, layout: BufferLayout) -> Result<SerializedBvh> {
    let capacity = layout.capacity();
    let mut buffer = FlatBuffer::with_layout("BVH buffer", layout);

    let max_index = root
        .max_tree_index()
        .ok_or_else(|| Error::capacity("BVH addressing table", usize::MAX, capacity))?;
    let table_len = max_index
        .checked_add(1)
        .and_then(|slots| slots.checked_mul(TEXEL))
        .ok_or_else(|| Error::capacity("BVH addressing table", usize::MAX, capacity))?;
    if table_len > capacity {
        return Err(Error::capacity("BVH addressing table", table_len, capacity));
    }

    let end = write_node(&mut buffer, root, 0, table_len)?;

    let table_texels = table_len / TEXEL;
    let body_texels = (end - table_len) / TEXEL;
    tracing::debug!(table_texels, body_texels, "BVH serialized");

    Ok(SerializedBvh {
        buffer,
        table_texels,
        body_texels,
    })
}

/// Write the record of `node` at `cursor` (scalar offset) and register it in
/// the table at `position`. Returns the cursor past the whole subtree.
fn write_node(
    buffer: &mut FlatBuffer,
    node: &BvhNode,
    position: usize,
    cursor: usize,
) -> Result<usize> {
    let pointer = cursor / TEXEL;
    if pointer >= MAX_EXACT_INDEX {
        return Err(Error::InexactIndex {
            what: "BVH record pointer",
            index: pointer,
            limit: MAX_EXACT_INDEX,
        });
    }
    buffer.set(position * TEXEL, pointer as f32)?;

    match node {
        BvhNode::Leaf { aabb, triangle_ids } => {
            let count = triangle_ids.len();
            let record_len = NODE_HEADER + count * TEXEL;
            buffer.ensure_fits(cursor + record_len)?;
            if let Some(&id) = triangle_ids.iter().find(|&&id| id as usize >= MAX_EXACT_INDEX) {
                return Err(Error::InexactIndex {
                    what: "BVH triangle id",
                    index: id as usize,
                    limit: MAX_EXACT_INDEX,
                });
            }

            buffer.write(
                cursor,
                &[
                    aabb.min.x,
                    aabb.min.y,
                    aabb.min.z,
                    NODE_TYPE_LEAF,
                    aabb.max.x,
                    aabb.max.y,
                    aabb.max.z,
                    count as f32,
                ],
            )?;
            for (i, &id) in triangle_ids.iter().enumerate() {
                buffer.write(cursor + NODE_HEADER + i * TEXEL, &[id as f32, 0.0, 0.0, 0.0])?;
            }
            Ok(cursor + record_len)
        }
        BvhNode::Node { aabb, left, right } => {
            buffer.write(
                cursor,
                &[
                    aabb.min.x,
                    aabb.min.y,
                    aabb.min.z,
                    NODE_TYPE_INTERNAL,
                    aabb.max.x,
                    aabb.max.y,
                    aabb.max.z,
                    0.0,
                ],
            )?;
            // positions were range-checked by max_tree_index
            let left_pos = left_child(position).unwrap_or(usize::MAX);
            let right_pos = right_child(position).unwrap_or(usize::MAX);
            let cursor = write_node(buffer, left, left_pos, cursor + NODE_HEADER)?;
            write_node(buffer, right, right_pos, cursor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Aabb, Vec3};

    fn unit_leaf(ids: &[u32]) -> BvhNode {
        BvhNode::Leaf {
            aabb: Aabb::new(Vec3::ZERO, Vec3::ONE),
            triangle_ids: ids.to_vec(),
        }
    }

    #[test]
    fn test_single_leaf_layout() {
        let out = serialize_bvh(&unit_leaf(&[3, 9]), BufferLayout::new(4, 4)).unwrap();
        let b = out.buffer.as_slice();
        assert_eq!(out.table_texels, 1);
        assert_eq!(out.body_texels, 4);
        // table: root record at texel 1
        assert_eq!(b[0], 1.0);
        assert_eq!(b[4..12], [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(b[12], 3.0);
        assert_eq!(b[16], 9.0);
        assert_eq!(b.len(), 20);
    }

    #[test]
    fn test_internal_node_layout() {
        let tree = BvhNode::Node {
            aabb: Aabb::new(Vec3::splat(-1.0), Vec3::splat(2.0)),
            left: Box::new(unit_leaf(&[0])),
            right: Box::new(unit_leaf(&[1, 2])),
        };
        let out = serialize_bvh(&tree, BufferLayout::new(8, 8)).unwrap();
        let b = out.buffer.as_slice();
        assert_eq!(out.table_texels, 3);

        // root record right after the 3-texel table
        assert_eq!(b[0], 3.0);
        assert_eq!(b[12..20], [-1.0, -1.0, -1.0, 0.0, 2.0, 2.0, 2.0, 0.0]);
        // left leaf follows the root header, right leaf follows the left subtree
        assert_eq!(b[4], 5.0);
        assert_eq!(b[8], 8.0);
        assert_eq!(b[20 + 3], NODE_TYPE_LEAF);
        assert_eq!(b[20 + 7], 1.0);
        assert_eq!(b[32 + 7], 2.0);
        assert_eq!(b[32 + 8], 1.0);
        assert_eq!(b[32 + 12], 2.0);
    }

    #[test]
    fn test_capacity_exceeded() {
        let ids: Vec<u32> = (0..10).collect();
        // table 4 + header 8 + 40 payload = 52 > 48
        let err = serialize_bvh(&unit_leaf(&ids), BufferLayout::new(4, 3)).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { required: 52, .. }));
    }

    #[test]
    fn test_inexact_triangle_id_rejected() {
        let id = MAX_EXACT_INDEX as u32 + 1;
        let err = serialize_bvh(&unit_leaf(&[0, id]), BufferLayout::new(4, 4)).unwrap_err();
        match err {
            Error::InexactIndex { what, index, limit } => {
                assert_eq!(what, "BVH triangle id");
                assert_eq!(index, id as usize);
                assert_eq!(limit, MAX_EXACT_INDEX);
            }
            other => panic!("unexpected error: {other}"),
        }

        // the last exact id still serializes
        let last = MAX_EXACT_INDEX as u32 - 1;
        let out = serialize_bvh(&unit_leaf(&[last]), BufferLayout::new(4, 4)).unwrap();
        assert_eq!(out.buffer.as_slice()[12], last as f32);
    }
}
