//! JSON scene description: camera, materials and a list of tagged shapes.
//!
//! ```json
//! {
//!   "camera": { "position": [0, 1, 5], "direction": [0, 0, -1] },
//!   "materials": [ { "name": "white", "color": [0.8, 0.8, 0.8] } ],
//!   "shapes": [
//!     { "kind": "mesh", "name": "floor", "material": "white",
//!       "positions": [[0,0,0],[1,0,0],[1,0,1],[0,0,1]], "faces": [[0,1,2,3]] }
//!   ]
//! }
//! ```
//!
//! Only `"mesh"` shapes are understood; other kinds are skipped with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::builder::{MeshDesc, SceneBuilder};
use super::camera::Camera;
use super::material::MaterialDesc;
use super::Scene;
use crate::config::BuildConfig;
use crate::util::Result;

/// Shape entry before its kind is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShape {
    pub kind: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub camera: Camera,
    pub materials: Vec<MaterialDesc>,
    pub shapes: Vec<RawShape>,
}

impl SceneDescription {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Run the description through a [`SceneBuilder`].
    #[tracing::instrument(skip_all, fields(shapes = self.shapes.len()))]
    pub fn into_scene(self, config: &BuildConfig) -> Result<Scene> {
        let mut builder = SceneBuilder::new(config.smooth_angle);
        builder.set_camera(self.camera);
        for material in self.materials {
            builder.add_material(material);
        }

        for shape in self.shapes {
            match shape.kind.as_str() {
                "mesh" => {
                    let mesh: MeshDesc = serde_json::from_value(Value::Object(shape.body))?;
                    builder.add_mesh(&mesh)?;
                }
                other => {
                    let name = shape.body.get("name").and_then(Value::as_str).unwrap_or("");
                    tracing::warn!(kind = other, name, "unsupported shape kind, skipping");
                }
            }
        }

        let scene = builder.finish();
        tracing::debug!(
            triangles = scene.triangles.len(),
            materials = scene.materials.len(),
            "scene assembled"
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Error, Vec3};

    const SCENE: &str = r#"{
        "camera": { "position": [0, 1, 5] },
        "materials": [
            { "name": "white" },
            { "name": "lamp", "emission": [4, 4, 4] }
        ],
        "shapes": [
            { "kind": "mesh", "name": "floor", "material": "white",
              "positions": [[0,0,0],[1,0,0],[1,0,1],[0,0,1]], "faces": [[0,1,2,3]] },
            { "kind": "sphere", "name": "ball", "radius": 1.0 },
            { "kind": "mesh", "name": "light", "material": "lamp",
              "positions": [[0,2,0],[1,2,0],[0,2,1]], "faces": [[0,1,2]] }
        ]
    }"#;

    #[test]
    fn test_parse_and_assemble() {
        let desc = SceneDescription::from_json(SCENE).unwrap();
        assert_eq!(desc.shapes.len(), 3);
        assert_eq!(desc.camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(desc.camera.up, Vec3::Y);

        let scene = desc.into_scene(&BuildConfig::default()).unwrap();
        // the sphere is skipped
        assert_eq!(scene.triangles.len(), 3);
        let lamp = scene.materials.by_name("lamp").unwrap();
        assert_eq!(lamp.id, 1);
        assert_eq!(lamp.emission, Vec3::splat(4.0));
        assert_eq!(lamp.triangle_range, Some(2..3));
    }

    #[test]
    fn test_bad_mesh_is_fatal() {
        let text = r#"{
            "materials": [ { "name": "m" } ],
            "shapes": [ { "kind": "mesh", "material": "m",
                          "positions": [[0,0,0],[1,0,0]], "faces": [[0,1]] } ]
        }"#;
        let err = SceneDescription::from_json(text)
            .unwrap()
            .into_scene(&BuildConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFaceArity { arity: 2, .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SceneDescription::from_json("{ \"shapes\": 3 }"),
            Err(Error::Json(_))
        ));
    }
}
