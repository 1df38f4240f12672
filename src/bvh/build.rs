//! SAH-based BVH builder.
//!
//! Top-down construction: at every node the primitives are sorted by
//! centroid along x, y and z in turn, and every split index of every sorted
//! order is scored with the surface area heuristic. The first split that is
//! strictly cheaper than keeping the node as a leaf (and than every earlier
//! candidate) wins. Nothing is binned or randomized, so identical input
//! always yields an identical tree.

use serde::{Deserialize, Serialize};

use super::node::BvhNode;
use crate::scene::Primitive;
use crate::util::{axis_component, Aabb};

/// Cost of intersecting one triangle.
pub const COST_TRIANGLE: f32 = 2.0;

/// Cost of testing one child bounding box.
pub const COST_AABB: f32 = 1.0;

/// SAH cost constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SahCosts {
    pub triangle: f32,
    pub aabb: f32,
}

impl Default for SahCosts {
    fn default() -> Self {
        Self {
            triangle: COST_TRIANGLE,
            aabb: COST_AABB,
        }
    }
}

impl SahCosts {
    /// Cost of keeping `count` primitives in one leaf.
    #[inline]
    pub fn leaf_cost(&self, count: usize) -> f32 {
        self.triangle * count as f32
    }
}

/// Winning split of one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitChoice {
    /// 0=x, 1=y, 2=z
    pub axis: usize,
    /// Left side is `[0..index)` of the sorted order, right is `[index..n)`
    pub index: usize,
    pub cost: f32,
    pub leaf_cost: f32,
}

/// Build a BVH with the default costs.
pub fn build_bvh(primitives: &[Primitive]) -> BvhNode {
    build_bvh_with(primitives, SahCosts::default())
}

/// Build a BVH over `primitives`.
///
/// Empty or single-primitive input yields a leaf. The root box always equals
/// the bounds of the whole input.
#[tracing::instrument(skip_all, fields(prim_count = primitives.len()))]
pub fn build_bvh_with(primitives: &[Primitive], costs: SahCosts) -> BvhNode {
    let root = build_node(primitives.to_vec(), costs);

    let stats = root.stats();
    tracing::debug!(
        nodes = stats.node_count,
        leaves = stats.leaf_count,
        depth = stats.depth,
        max_leaf = stats.max_leaf_size,
        "BVH built"
    );
    root
}

/// Best SAH split of `primitives`, or `None` when a leaf is cheaper.
pub fn find_best_split(primitives: &[Primitive], costs: SahCosts) -> Option<SplitChoice> {
    let bounds = bounds_of(primitives);
    search_split(primitives, &bounds, costs).map(|(choice, _)| choice)
}

fn build_node(primitives: Vec<Primitive>, costs: SahCosts) -> BvhNode {
    let bounds = bounds_of(&primitives);

    match search_split(&primitives, &bounds, costs) {
        None => BvhNode::Leaf {
            aabb: bounds,
            triangle_ids: primitives.iter().map(|p| p.id).collect(),
        },
        Some((choice, mut ordered)) => {
            // both halves are non-empty, so each call sees a smaller set
            let right = ordered.split_off(choice.index);
            BvhNode::Node {
                aabb: bounds,
                left: Box::new(build_node(ordered, costs)),
                right: Box::new(build_node(right, costs)),
            }
        }
    }
}

/// Bounds enclosing every corner of every primitive.
fn bounds_of(primitives: &[Primitive]) -> Aabb {
    primitives
        .iter()
        .fold(Aabb::EMPTY, |acc, p| acc.union(p.aabb()))
}

/// Sweep all three axes. Returns the winning split together with the
/// primitive order it indexes into.
fn search_split(
    primitives: &[Primitive],
    bounds: &Aabb,
    costs: SahCosts,
) -> Option<(SplitChoice, Vec<Primitive>)> {
    let n = primitives.len();
    let leaf_cost = costs.leaf_cost(n);
    let total_area = bounds.surface_area();

    let mut best_cost = leaf_cost;
    let mut best: Option<(SplitChoice, Vec<Primitive>)> = None;

    for axis in 0..3 {
        let mut sorted = primitives.to_vec();
        // stable: equal centroids keep their incoming order, NaN sorts last
        sorted.sort_by(|a, b| {
            axis_component(a.centroid(), axis).total_cmp(&axis_component(b.centroid(), axis))
        });

        // suffix_area[k] = SA of [k..n)
        let mut suffix_area = vec![0.0f32; n];
        let mut sweep = Aabb::EMPTY;
        for k in (0..n).rev() {
            sweep = sweep.union(sorted[k].aabb());
            suffix_area[k] = sweep.surface_area();
        }

        let mut improved_at = None;
        let mut prefix = Aabb::EMPTY;
        for k in 1..n {
            prefix = prefix.union(sorted[k - 1].aabb());
            let cost = 2.0 * costs.aabb
                + costs.triangle * k as f32 * prefix.surface_area() / total_area
                + costs.triangle * (n - k) as f32 * suffix_area[k] / total_area;

            // NaN never wins, so zero-area input stays a leaf
            if cost < best_cost {
                best_cost = cost;
                improved_at = Some(SplitChoice {
                    axis,
                    index: k,
                    cost,
                    leaf_cost,
                });
            }
        }

        if let Some(choice) = improved_at {
            best = Some((choice, sorted));
        }
    }

    best
}
