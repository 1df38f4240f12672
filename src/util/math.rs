//! Math type re-exports and the axis-aligned bounding box.
//!
//! Boxes are combined by value: every operation returns a new [`Aabb`]
//! instead of growing a shared accumulator in place.

pub use glam::{Vec3, Vec4};

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box with single precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty bounding box (inverted, becomes valid on first union).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Bounding box of a set of points. Empty input yields [`Aabb::EMPTY`].
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |acc, p| acc.with_point(p))
    }

    /// Check if this box is empty (inverted on some axis).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// New box covering `self` and `p`.
    #[inline]
    #[must_use]
    pub fn with_point(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// New box covering both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Surface area (for SAH cost). Zero for empty or flat-and-thin boxes.
    #[inline]
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// True if `other` lies entirely inside `self` (boundaries inclusive).
    /// An empty box is contained in anything.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aabb({:?} - {:?})", self.min, self.max)
    }
}

/// Component of `v` along axis 0=x, 1=y, 2=z.
#[inline]
pub fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box() {
        let b = Aabb::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.surface_area(), 0.0);
        assert_eq!(b.min, Vec3::splat(f32::INFINITY));
        assert_eq!(b.max, Vec3::splat(f32::NEG_INFINITY));
    }

    #[test]
    fn test_union_is_pure() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let u = a.union(b);
        assert_eq!(u, Aabb::new(Vec3::ZERO, Vec3::splat(3.0)));
        // operands untouched
        assert_eq!(a, Aabb::new(Vec3::ZERO, Vec3::ONE));
        assert_eq!(Aabb::EMPTY.union(a), a);
    }

    #[test]
    fn test_surface_area() {
        let unit = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(unit.surface_area(), 6.0);
        let flat = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(flat.surface_area(), 2.0);
        let point = Aabb::from_point(Vec3::ONE);
        assert_eq!(point.surface_area(), 0.0);
    }

    #[test]
    fn test_from_points_and_contains() {
        let b = Aabb::from_points([Vec3::new(1.0, -1.0, 0.0), Vec3::new(-2.0, 4.0, 1.0)]);
        assert_eq!(b.min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 1.0));
        assert!(b.contains(&Aabb::from_point(Vec3::ZERO)));
        assert!(!b.contains(&Aabb::from_point(Vec3::splat(5.0))));
        assert!(b.contains(&Aabb::EMPTY));
    }
}
