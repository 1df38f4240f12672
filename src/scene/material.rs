//! Materials and the name -> dense id table.

use std::collections::HashMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::util::{Aabb, Vec3};

/// Surface description as written by the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    pub name: String,
    pub color: Vec3,
    pub emission: Vec3,
    pub specular: Vec3,
    pub specular_weight: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Vec3::splat(0.8),
            emission: Vec3::ZERO,
            specular: Vec3::ONE,
            specular_weight: 0.0,
        }
    }
}

impl MaterialDesc {
    /// Grey diffuse material with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Material with its resolved geometry footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Dense, 0-based, assignment order
    pub id: u32,
    pub name: String,
    pub emission: Vec3,
    pub color: Vec3,
    pub specular: Vec3,
    pub specular_weight: f32,
    /// Bounds of every triangle using this material
    pub aabb: Option<Aabb>,
    /// Half-open block of triangle ids owning this material
    pub triangle_range: Option<Range<u32>>,
}

impl Material {
    fn from_desc(id: u32, desc: MaterialDesc) -> Self {
        Self {
            id,
            name: desc.name,
            emission: desc.emission,
            color: desc.color,
            specular: desc.specular,
            specular_weight: desc.specular_weight,
            aabb: None,
            triangle_range: None,
        }
    }
}

/// Insertion-ordered association from material name to dense id.
///
/// Built once while loading, then treated as read-only by the encoder.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    by_name: HashMap<String, u32>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material. A name seen before keeps its first id and definition.
    pub fn insert(&mut self, desc: MaterialDesc) -> u32 {
        if let Some(&id) = self.by_name.get(&desc.name) {
            return id;
        }
        let id = self.materials.len() as u32;
        self.by_name.insert(desc.name.clone(), id);
        self.materials.push(Material::from_desc(id, desc));
        id
    }

    /// Id of a material by name.
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: u32) -> Option<&Material> {
        self.materials.get(id as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Material> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub(crate) fn get_mut(&mut self, id: u32) -> Option<&mut Material> {
        self.materials.get_mut(id as usize)
    }

    /// Materials in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut table = MaterialTable::new();
        assert_eq!(table.insert(MaterialDesc::named("floor")), 0);
        assert_eq!(table.insert(MaterialDesc::named("light")), 1);
        assert_eq!(table.insert(MaterialDesc::named("wall")), 2);
        assert_eq!(table.len(), 3);

        let names: Vec<&str> = table.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["floor", "light", "wall"]);
        assert_eq!(table.by_name("light").map(|m| m.id), Some(1));
    }

    #[test]
    fn test_duplicate_name_keeps_first() {
        let mut table = MaterialTable::new();
        let mut first = MaterialDesc::named("red");
        first.color = Vec3::X;
        table.insert(first);

        let mut second = MaterialDesc::named("red");
        second.color = Vec3::Y;
        assert_eq!(table.insert(second), 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).map(|m| m.color), Some(Vec3::X));
    }
}
