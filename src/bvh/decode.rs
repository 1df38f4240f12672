//! Read a serialized BVH back through its addressing table.
//!
//! Mirrors what the GPU traversal does, which makes it the reference for
//! checking the buffer layout.

use super::node::{left_child, right_child, BvhNode};
use super::serialize::{NODE_HEADER, NODE_TYPE_INTERNAL, NODE_TYPE_LEAF};
use crate::gpu::TEXEL;
use crate::util::{Aabb, Error, Result, Vec3};

/// Rebuild the tree stored in `buffer`.
pub fn decode_bvh(buffer: &[f32]) -> Result<BvhNode> {
    decode_at(buffer, 0)
}

fn read(buffer: &[f32], index: usize) -> Result<f32> {
    buffer
        .get(index)
        .copied()
        .ok_or_else(|| Error::malformed(format!("read past end at scalar {index}")))
}

fn decode_at(buffer: &[f32], position: usize) -> Result<BvhNode> {
    let slot = position
        .checked_mul(TEXEL)
        .ok_or_else(|| Error::malformed("heap position overflow"))?;
    let texel = read(buffer, slot)?;
    if texel < 0.0 || texel.fract() != 0.0 {
        return Err(Error::malformed(format!(
            "bad record pointer {texel} at position {position}"
        )));
    }
    if texel >= (buffer.len() / TEXEL) as f32 {
        return Err(Error::malformed(format!(
            "record pointer {texel} at position {position} is past the buffer end"
        )));
    }
    let base = texel as usize * TEXEL;
    if base <= slot {
        return Err(Error::malformed(format!(
            "record pointer {texel} at position {position} points into the table"
        )));
    }

    let header: Vec<f32> = (base..base + NODE_HEADER)
        .map(|i| read(buffer, i))
        .collect::<Result<_>>()?;
    let aabb = Aabb::new(
        Vec3::new(header[0], header[1], header[2]),
        Vec3::new(header[4], header[5], header[6]),
    );

    if header[3] == NODE_TYPE_LEAF {
        let count = header[7];
        let remaining = (buffer.len() - base - NODE_HEADER) / TEXEL;
        if count < 0.0 || count.fract() != 0.0 || count > remaining as f32 {
            return Err(Error::malformed(format!("bad leaf count {count}")));
        }
        let triangle_ids = (0..count as usize)
            .map(|i| read(buffer, base + NODE_HEADER + i * TEXEL).map(|id| id as u32))
            .collect::<Result<_>>()?;
        Ok(BvhNode::Leaf { aabb, triangle_ids })
    } else if header[3] == NODE_TYPE_INTERNAL {
        let left_pos = left_child(position).ok_or_else(|| Error::malformed("heap position overflow"))?;
        let right_pos =
            right_child(position).ok_or_else(|| Error::malformed("heap position overflow"))?;
        Ok(BvhNode::Node {
            aabb,
            left: Box::new(decode_at(buffer, left_pos)?),
            right: Box::new(decode_at(buffer, right_pos)?),
        })
    } else {
        Err(Error::malformed(format!(
            "unknown node type {} at texel {texel}",
            header[3]
        )))
    }
}
