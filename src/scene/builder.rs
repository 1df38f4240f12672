//! Assemble loader output into the triangle list and material table the
//! core consumes.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::material::{MaterialDesc, MaterialTable};
use super::normals::smooth_corner_normals;
use super::triangle::Triangle;
use super::Scene;
use crate::util::{Aabb, Error, Result, Vec3};

/// Default crease angle for generated smooth normals (degrees).
pub const DEFAULT_SMOOTH_ANGLE: f32 = 45.0;

/// Indexed polygon mesh with a single material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDesc {
    pub name: String,
    pub material: String,
    pub positions: Vec<Vec3>,
    /// Triangles or quads, as indices into `positions`
    pub faces: Vec<Vec<u32>>,
    /// Optional per-position normals, used when `smooth` is set
    pub normals: Option<Vec<Vec3>>,
    pub smooth: bool,
}

/// Incrementally collects meshes, assigning triangle ids as they are created.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    triangles: Vec<Triangle>,
    materials: MaterialTable,
    camera: Camera,
    smooth_angle: f32,
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTH_ANGLE)
    }
}

impl SceneBuilder {
    pub fn new(smooth_angle: f32) -> Self {
        Self {
            triangles: Vec::new(),
            materials: MaterialTable::new(),
            camera: Camera::default(),
            smooth_angle,
        }
    }

    /// Register a material; returns its dense id.
    pub fn add_material(&mut self, desc: MaterialDesc) -> u32 {
        self.materials.insert(desc)
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Triangulate `mesh` and append it. Returns the ids given to its triangles.
    ///
    /// Quads `(a, b, c, d)` become `(a, b, c)` and `(a, c, d)`. Any other face
    /// arity aborts with [`Error::UnsupportedFaceArity`]; nothing from a
    /// failed mesh is kept.
    pub fn add_mesh(&mut self, mesh: &MeshDesc) -> Result<Range<u32>> {
        let material_id = self
            .materials
            .id_of(&mesh.material)
            .ok_or_else(|| Error::UnknownMaterial(mesh.material.clone()))?;

        if let Some(normals) = &mesh.normals {
            if normals.len() != mesh.positions.len() {
                return Err(Error::invalid(format!(
                    "mesh {:?}: {} normals for {} positions",
                    mesh.name,
                    normals.len(),
                    mesh.positions.len()
                )));
            }
        }

        let mut corner_indices: Vec<[usize; 3]> = Vec::with_capacity(mesh.faces.len());
        for face in &mesh.faces {
            if let Some(&bad) = face.iter().find(|&&i| i as usize >= mesh.positions.len()) {
                return Err(Error::invalid(format!(
                    "mesh {:?}: vertex index {bad} out of range ({} positions)",
                    mesh.name,
                    mesh.positions.len()
                )));
            }
            let idx: Vec<usize> = face.iter().map(|&i| i as usize).collect();
            match idx.len() {
                3 => corner_indices.push([idx[0], idx[1], idx[2]]),
                4 => {
                    corner_indices.push([idx[0], idx[1], idx[2]]);
                    corner_indices.push([idx[0], idx[2], idx[3]]);
                }
                arity => {
                    return Err(Error::UnsupportedFaceArity {
                        arity,
                        shape: mesh.name.clone(),
                    })
                }
            }
        }

        let corners: Vec<[Vec3; 3]> = corner_indices
            .iter()
            .map(|tri| tri.map(|i| mesh.positions[i]))
            .collect();

        let normals: Option<Vec<[Vec3; 3]>> = if !mesh.smooth {
            None
        } else if let Some(given) = &mesh.normals {
            Some(corner_indices.iter().map(|tri| tri.map(|i| given[i])).collect())
        } else {
            Some(smooth_corner_normals(&corners, self.smooth_angle))
        };

        let start = self.triangles.len() as u32;
        for (i, c) in corners.into_iter().enumerate() {
            let id = start + i as u32;
            let tri = match &normals {
                Some(n) => Triangle::smooth(id, material_id, c, n[i]),
                None => Triangle::flat(id, material_id, c[0], c[1], c[2]),
            };
            self.triangles.push(tri);
        }
        let end = self.triangles.len() as u32;

        tracing::trace!(mesh = %mesh.name, triangles = end - start, "mesh added");
        Ok(start..end)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Resolve per-material bounds and triangle ranges, and hand over the scene.
    ///
    /// A material whose triangles are not one contiguous id block keeps its
    /// bounds but gets no range.
    pub fn finish(mut self) -> Scene {
        struct Footprint {
            aabb: Aabb,
            first: u32,
            last: u32,
            count: u32,
        }

        let mut footprints: Vec<Option<Footprint>> =
            (0..self.materials.len()).map(|_| None).collect();

        for tri in &self.triangles {
            let Some(slot) = footprints.get_mut(tri.material_id as usize) else {
                continue;
            };
            let tri_box = Aabb::from_points(tri.corners());
            match slot {
                Some(fp) => {
                    fp.aabb = fp.aabb.union(tri_box);
                    fp.first = fp.first.min(tri.id);
                    fp.last = fp.last.max(tri.id);
                    fp.count += 1;
                }
                None => {
                    *slot = Some(Footprint {
                        aabb: tri_box,
                        first: tri.id,
                        last: tri.id,
                        count: 1,
                    })
                }
            }
        }

        for (id, fp) in footprints.into_iter().enumerate() {
            let Some(fp) = fp else { continue };
            let Some(material) = self.materials.get_mut(id as u32) else {
                continue;
            };
            material.aabb = Some(fp.aabb);
            if fp.last - fp.first + 1 == fp.count {
                material.triangle_range = Some(fp.first..fp.last + 1);
            } else {
                tracing::warn!(
                    material = %material.name,
                    "triangles are not contiguous, no triangle range recorded"
                );
            }
        }

        Scene {
            triangles: self.triangles,
            materials: self.materials,
            camera: self.camera,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_mesh(material: &str) -> MeshDesc {
        MeshDesc {
            name: "quad".into(),
            material: material.into(),
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![vec![0, 1, 2, 3]],
            ..Default::default()
        }
    }

    #[test]
    fn test_quad_split() {
        let mut b = SceneBuilder::default();
        b.add_material(MaterialDesc::named("white"));
        let ids = b.add_mesh(&quad_mesh("white")).unwrap();
        assert_eq!(ids, 0..2);

        let scene = b.finish();
        assert_eq!(scene.triangles.len(), 2);
        let t1 = &scene.triangles[1];
        assert_eq!(t1.corners(), [Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::Y]);
        let white = scene.materials.by_name("white").unwrap();
        assert_eq!(white.triangle_range, Some(0..2));
        assert_eq!(white.aabb, Some(Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))));
    }

    #[test]
    fn test_pentagon_is_fatal() {
        let mut b = SceneBuilder::default();
        b.add_material(MaterialDesc::named("m"));
        let mut mesh = quad_mesh("m");
        mesh.positions.push(Vec3::new(0.5, 2.0, 0.0));
        mesh.faces = vec![vec![0, 1, 2], vec![0, 1, 2, 3, 4]];
        let err = b.add_mesh(&mesh).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFaceArity { arity: 5, .. }));
        // nothing from the failed mesh was kept
        assert_eq!(b.triangle_count(), 0);
    }

    #[test]
    fn test_unknown_material_and_bad_index() {
        let mut b = SceneBuilder::default();
        assert!(matches!(
            b.add_mesh(&quad_mesh("missing")),
            Err(Error::UnknownMaterial(name)) if name == "missing"
        ));

        b.add_material(MaterialDesc::named("m"));
        let mut mesh = quad_mesh("m");
        mesh.faces = vec![vec![0, 1, 9]];
        assert!(matches!(b.add_mesh(&mesh), Err(Error::InvalidScene(_))));
    }

    #[test]
    fn test_smooth_mesh_gets_normals() {
        let mut b = SceneBuilder::default();
        b.add_material(MaterialDesc::named("m"));
        let mut mesh = quad_mesh("m");
        mesh.smooth = true;
        b.add_mesh(&mesh).unwrap();
        let scene = b.finish();
        for tri in &scene.triangles {
            assert!(tri.smooth);
            for n in tri.normals {
                let n = n.expect("normal");
                assert!((n - Vec3::Z).length() < 1e-6);
            }
        }
    }

    #[test]
    fn test_interleaved_material_has_no_range() {
        let mut b = SceneBuilder::default();
        b.add_material(MaterialDesc::named("a"));
        b.add_material(MaterialDesc::named("b"));
        b.add_material(MaterialDesc::named("unused"));
        b.add_mesh(&quad_mesh("a")).unwrap();
        b.add_mesh(&quad_mesh("b")).unwrap();
        b.add_mesh(&quad_mesh("a")).unwrap();
        let scene = b.finish();

        let a = scene.materials.by_name("a").unwrap();
        assert_eq!(a.triangle_range, None);
        assert!(a.aabb.is_some());
        assert_eq!(scene.materials.by_name("b").unwrap().triangle_range, Some(2..4));
        let unused = scene.materials.by_name("unused").unwrap();
        assert_eq!(unused.triangle_range, None);
        assert_eq!(unused.aabb, None);
    }
}
