//! Triangle and primitive records.

use crate::util::{Aabb, Vec3};

/// Minimal geometric unit the BVH builder works with.
///
/// Corners are `vertex`, `vertex + edge1` and `vertex + edge2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub id: u32,
    pub vertex: Vec3,
    pub edge1: Vec3,
    pub edge2: Vec3,
}

impl Primitive {
    /// Primitive from three corner positions.
    pub fn from_corners(id: u32, p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        Self {
            id,
            vertex: p0,
            edge1: p1 - p0,
            edge2: p2 - p0,
        }
    }

    /// The three corners.
    #[inline]
    pub fn corners(&self) -> [Vec3; 3] {
        [self.vertex, self.vertex + self.edge1, self.vertex + self.edge2]
    }

    /// Centroid, `vertex + (edge1 + edge2) / 3`.
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.vertex + (self.edge1 + self.edge2) / 3.0
    }

    /// Bounding box of the three corners.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(self.corners())
    }
}

/// Triangle as handed over by the scene loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Stable id, assigned once at creation
    pub id: u32,
    pub material_id: u32,
    pub vertex: Vec3,
    pub edge1: Vec3,
    pub edge2: Vec3,
    /// Smooth-shaded; normals are meaningful only when set
    pub smooth: bool,
    pub normals: [Option<Vec3>; 3],
}

impl Triangle {
    /// Flat-shaded triangle from three corner positions.
    pub fn flat(id: u32, material_id: u32, p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        Self {
            id,
            material_id,
            vertex: p0,
            edge1: p1 - p0,
            edge2: p2 - p0,
            smooth: false,
            normals: [None; 3],
        }
    }

    /// Smooth-shaded triangle with per-vertex normals.
    pub fn smooth(
        id: u32,
        material_id: u32,
        corners: [Vec3; 3],
        normals: [Vec3; 3],
    ) -> Self {
        let [p0, p1, p2] = corners;
        Self {
            id,
            material_id,
            vertex: p0,
            edge1: p1 - p0,
            edge2: p2 - p0,
            smooth: true,
            normals: normals.map(Some),
        }
    }

    /// The reference the BVH builder consumes.
    #[inline]
    pub fn primitive(&self) -> Primitive {
        Primitive {
            id: self.id,
            vertex: self.vertex,
            edge1: self.edge1,
            edge2: self.edge2,
        }
    }

    /// The three corners.
    #[inline]
    pub fn corners(&self) -> [Vec3; 3] {
        self.primitive().corners()
    }

    /// Unit geometric normal from the winding, zero for degenerate triangles.
    pub fn face_normal(&self) -> Vec3 {
        self.edge1.cross(self.edge2).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_and_centroid() {
        let p = Primitive::from_corners(
            7,
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        );
        assert_eq!(p.corners()[1], Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(p.centroid(), Vec3::new(1.0, 1.0, 0.0));
        let b = p.aabb();
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, Vec3::new(3.0, 3.0, 0.0));
    }

    #[test]
    fn test_triangle_projection() {
        let t = Triangle::flat(4, 1, Vec3::ZERO, Vec3::X, Vec3::Y);
        let p = t.primitive();
        assert_eq!(p.id, 4);
        assert_eq!(p.edge1, Vec3::X);
        assert_eq!(t.face_normal(), Vec3::Z);
        assert!(!t.smooth);
        assert_eq!(t.normals, [None; 3]);
    }
}
