//! In-memory BVH tree.

use crate::util::Aabb;

/// A BVH node - either a leaf holding triangle ids or an internal node
/// exclusively owning two children.
#[derive(Debug, Clone, PartialEq)]
pub enum BvhNode {
    /// Internal node with two children.
    Node {
        aabb: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
    /// Leaf node with triangle ids in builder order.
    Leaf { aabb: Aabb, triangle_ids: Vec<u32> },
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Longest root-to-leaf path, root alone = 1
    pub depth: usize,
    pub max_leaf_size: usize,
    pub triangle_count: usize,
    /// Highest heap position (root 0, children 2p+1 / 2p+2); `None` when it
    /// does not fit in `usize`
    pub max_tree_index: Option<usize>,
}

impl BvhNode {
    /// Bounding box of this node.
    pub fn aabb(&self) -> &Aabb {
        match self {
            BvhNode::Node { aabb, .. } | BvhNode::Leaf { aabb, .. } => aabb,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    /// All triangle ids, leaves visited in pre-order.
    pub fn triangle_ids(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.visit_leaves(&mut |_, ids| out.extend_from_slice(ids));
        out
    }

    /// Call `f(aabb, ids)` for every leaf, left to right.
    pub fn visit_leaves<'a>(&'a self, f: &mut impl FnMut(&'a Aabb, &'a [u32])) {
        match self {
            BvhNode::Leaf { aabb, triangle_ids } => f(aabb, triangle_ids),
            BvhNode::Node { left, right, .. } => {
                left.visit_leaves(&mut *f);
                right.visit_leaves(&mut *f);
            }
        }
    }

    /// Highest heap position used by the tree, `None` on overflow.
    pub fn max_tree_index(&self) -> Option<usize> {
        max_index_from(self, Some(0))
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            max_tree_index: self.max_tree_index(),
            ..Default::default()
        };
        collect_stats(self, 1, &mut stats);
        stats
    }
}

fn max_index_from(node: &BvhNode, position: Option<usize>) -> Option<usize> {
    let p = position?;
    match node {
        BvhNode::Leaf { .. } => Some(p),
        BvhNode::Node { left, right, .. } => {
            let l = max_index_from(left, left_child(p))?;
            let r = max_index_from(right, right_child(p))?;
            Some(l.max(r))
        }
    }
}

/// Heap position of the left child, `None` on overflow.
#[inline]
pub fn left_child(p: usize) -> Option<usize> {
    p.checked_mul(2)?.checked_add(1)
}

/// Heap position of the right child, `None` on overflow.
#[inline]
pub fn right_child(p: usize) -> Option<usize> {
    p.checked_mul(2)?.checked_add(2)
}

fn collect_stats(node: &BvhNode, depth: usize, stats: &mut TreeStats) {
    stats.node_count += 1;
    stats.depth = stats.depth.max(depth);
    match node {
        BvhNode::Leaf { triangle_ids, .. } => {
            stats.leaf_count += 1;
            stats.triangle_count += triangle_ids.len();
            stats.max_leaf_size = stats.max_leaf_size.max(triangle_ids.len());
        }
        BvhNode::Node { left, right, .. } => {
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Vec3;

    fn leaf(ids: &[u32]) -> BvhNode {
        BvhNode::Leaf {
            aabb: Aabb::new(Vec3::ZERO, Vec3::ONE),
            triangle_ids: ids.to_vec(),
        }
    }

    fn node(left: BvhNode, right: BvhNode) -> BvhNode {
        BvhNode::Node {
            aabb: Aabb::new(Vec3::ZERO, Vec3::ONE),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn test_stats_and_max_index() {
        // root(0) -> leaf(1), node(2) -> leaf(5), leaf(6)
        let tree = node(leaf(&[0, 1]), node(leaf(&[2]), leaf(&[3, 4, 5])));
        let stats = tree.stats();
        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.depth, 3);
        assert_eq!(stats.max_leaf_size, 3);
        assert_eq!(stats.triangle_count, 6);
        assert_eq!(stats.max_tree_index, Some(6));
        assert_eq!(tree.triangle_ids(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_max_index_overflow() {
        // a right-leaning chain deep enough to overflow heap positions
        let mut tree = leaf(&[0]);
        for i in 1..80 {
            tree = node(leaf(&[i]), tree);
        }
        assert_eq!(tree.max_tree_index(), None);
        assert_eq!(tree.stats().depth, 80);
    }
}
