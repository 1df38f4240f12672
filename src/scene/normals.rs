//! Per-vertex normals for smooth meshes that arrive without them.
//!
//! Corners sharing a (quantized) position average the face normals of their
//! neighbours, but only across edges flatter than the crease angle.

use std::collections::HashMap;

use crate::util::Vec3;

/// Positions closer than 1/QUANT are welded together.
const QUANT: f32 = 10000.0;

type PosKey = (i32, i32, i32);

fn pos_key(p: Vec3) -> PosKey {
    (
        (p.x * QUANT).round() as i32,
        (p.y * QUANT).round() as i32,
        (p.z * QUANT).round() as i32,
    )
}

/// Smooth normals for every corner of every triangle.
///
/// `triangles` holds corner positions; the result has the same shape.
/// `angle_deg` is the crease threshold: neighbouring faces bent further
/// than this keep their own normal.
pub fn smooth_corner_normals(triangles: &[[Vec3; 3]], angle_deg: f32) -> Vec<[Vec3; 3]> {
    let face_normals: Vec<Vec3> = triangles
        .iter()
        .map(|[a, b, c]| (*b - *a).cross(*c - *a).normalize_or_zero())
        .collect();

    // position -> faces touching it
    let mut groups: HashMap<PosKey, Vec<usize>> = HashMap::new();
    for (face, corners) in triangles.iter().enumerate() {
        for p in corners {
            let faces = groups.entry(pos_key(*p)).or_default();
            if faces.last() != Some(&face) {
                faces.push(face);
            }
        }
    }

    let cos_threshold = angle_deg.to_radians().cos();

    triangles
        .iter()
        .enumerate()
        .map(|(face, corners)| {
            let own = face_normals[face];
            (*corners).map(|p| {
                let Some(faces) = groups.get(&pos_key(p)) else {
                    return own;
                };
                let sum: Vec3 = faces
                    .iter()
                    .map(|&f| face_normals[f])
                    .filter(|n| own.dot(*n) >= cos_threshold)
                    .sum();
                let n = sum.normalize_or_zero();
                if n == Vec3::ZERO {
                    own
                } else {
                    n
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_patch_keeps_face_normal() {
        let tris = [
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
        ];
        let normals = smooth_corner_normals(&tris, 45.0);
        for corner in normals.iter().flatten() {
            assert!((*corner - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_crease_threshold() {
        // two faces folded 90 degrees along the x axis
        let tris = [
            [Vec3::ZERO, Vec3::X, Vec3::Y],
            [Vec3::ZERO, Vec3::Z, Vec3::X],
        ];
        let sharp = smooth_corner_normals(&tris, 45.0);
        assert!((sharp[0][0] - Vec3::Z).length() < 1e-6);
        assert!((sharp[1][0] - Vec3::Y).length() < 1e-6);

        let soft = smooth_corner_normals(&tris, 120.0);
        let expected = (Vec3::Z + Vec3::Y).normalize();
        assert!((soft[0][0] - expected).length() < 1e-6);
        assert!((soft[1][1] - Vec3::Y).length() < 1e-6); // corner not shared
    }
}
