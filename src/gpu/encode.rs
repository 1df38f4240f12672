//! Pack triangles and materials into fixed-stride records.
//!
//! The record of entity `id` lives at `buffer[id * STRIDE ..]`; vectors take the first three
//! scalars of a texel and spare fourth scalars carry flags and ids.
//!
//! Triangle (24 scalars):
//! ```text
//!  0: vertex.xyz  material_id
//!  4: edge1.xyz   -
//!  8: edge2.xyz   smooth (0/1)
//! 12: normal0.xyz -
//! 16: normal1.xyz -
//! 20: normal2.xyz -
//! ```
//!
//! Material (20 scalars):
//! ```text
//!  0: color.xyz    -
//!  4: emission.xyz -
//!  8: specular.xyz specular_weight
//! 12: aabb_min.xyz range_start (-1 if none)
//! 16: aabb_max.xyz range_end   (-1 if none)
//! ```

use std::ops::Range;

use super::flat_buffer::{BufferLayout, FlatBuffer};
use crate::scene::{MaterialTable, Triangle};
use crate::util::{Error, Result, Vec3};

/// Scalars per triangle record.
pub const TRIANGLE_STRIDE: usize = 24;

/// Scalars per material record.
pub const MATERIAL_STRIDE: usize = 20;

const TRI_VERTEX: usize = 0;
const TRI_MATERIAL: usize = 3;
const TRI_EDGE1: usize = 4;
const TRI_EDGE2: usize = 8;
const TRI_SMOOTH: usize = 11;
const TRI_NORMALS: [usize; 3] = [12, 16, 20];

const MAT_COLOR: usize = 0;
const MAT_EMISSION: usize = 4;
const MAT_SPECULAR: usize = 8;
const MAT_SPECULAR_WEIGHT: usize = 11;
const MAT_AABB_MIN: usize = 12;
const MAT_RANGE_START: usize = 15;
const MAT_AABB_MAX: usize = 16;
const MAT_RANGE_END: usize = 19;

/// Range bound written when a material owns no geometry.
pub const NO_RANGE: f32 = -1.0;

fn put_vec3(record: &mut [f32], offset: usize, v: Vec3) {
    record[offset..offset + 3].copy_from_slice(&v.to_array());
}

fn get_vec3(record: &[f32], offset: usize) -> Vec3 {
    Vec3::new(record[offset], record[offset + 1], record[offset + 2])
}

fn record_offset(id: u32, stride: usize, what: &'static str, capacity: usize) -> Result<usize> {
    (id as usize)
        .checked_mul(stride)
        .ok_or_else(|| Error::capacity(what, usize::MAX, capacity))
}

/// Encode every triangle at `id * TRIANGLE_STRIDE`.
#[tracing::instrument(skip_all, fields(tri_count = triangles.len()))]
pub fn encode_triangles(triangles: &[Triangle], layout: BufferLayout) -> Result<FlatBuffer> {
    let mut buffer = FlatBuffer::with_layout("triangle buffer", layout);

    for tri in triangles {
        let mut record = [0.0f32; TRIANGLE_STRIDE];
        put_vec3(&mut record, TRI_VERTEX, tri.vertex);
        record[TRI_MATERIAL] = tri.material_id as f32;
        put_vec3(&mut record, TRI_EDGE1, tri.edge1);
        put_vec3(&mut record, TRI_EDGE2, tri.edge2);
        record[TRI_SMOOTH] = if tri.smooth { 1.0 } else { 0.0 };
        for (normal, &offset) in tri.normals.iter().zip(TRI_NORMALS.iter()) {
            put_vec3(&mut record, offset, normal.unwrap_or(Vec3::ZERO));
        }

        let offset = record_offset(tri.id, TRIANGLE_STRIDE, "triangle buffer", buffer.capacity())?;
        buffer.write(offset, &record)?;
    }

    Ok(buffer)
}

/// Encode every material at `id * MATERIAL_STRIDE`.
#[tracing::instrument(skip_all, fields(material_count = materials.len()))]
pub fn encode_materials(materials: &MaterialTable, layout: BufferLayout) -> Result<FlatBuffer> {
    let mut buffer = FlatBuffer::with_layout("material buffer", layout);

    for mat in materials.iter() {
        let mut record = [0.0f32; MATERIAL_STRIDE];
        put_vec3(&mut record, MAT_COLOR, mat.color);
        put_vec3(&mut record, MAT_EMISSION, mat.emission);
        put_vec3(&mut record, MAT_SPECULAR, mat.specular);
        record[MAT_SPECULAR_WEIGHT] = mat.specular_weight;
        if let Some(aabb) = mat.aabb {
            put_vec3(&mut record, MAT_AABB_MIN, aabb.min);
            put_vec3(&mut record, MAT_AABB_MAX, aabb.max);
        }
        let (start, end) = match &mat.triangle_range {
            Some(range) => (range.start as f32, range.end as f32),
            None => (NO_RANGE, NO_RANGE),
        };
        record[MAT_RANGE_START] = start;
        record[MAT_RANGE_END] = end;

        let offset = record_offset(mat.id, MATERIAL_STRIDE, "material buffer", buffer.capacity())?;
        buffer.write(offset, &record)?;
    }

    Ok(buffer)
}

fn record<'a>(buffer: &'a [f32], id: u32, stride: usize) -> Result<&'a [f32]> {
    let start = id as usize * stride;
    buffer
        .get(start..start + stride)
        .ok_or_else(|| Error::malformed(format!("record {id} lies past the end of the buffer")))
}

/// Read triangle `id` back from an encoded buffer.
///
/// Normals are reported only for smooth triangles.
pub fn decode_triangle(buffer: &[f32], id: u32) -> Result<Triangle> {
    let r = record(buffer, id, TRIANGLE_STRIDE)?;
    let smooth = r[TRI_SMOOTH] != 0.0;
    Ok(Triangle {
        id,
        material_id: r[TRI_MATERIAL] as u32,
        vertex: get_vec3(r, TRI_VERTEX),
        edge1: get_vec3(r, TRI_EDGE1),
        edge2: get_vec3(r, TRI_EDGE2),
        smooth,
        normals: TRI_NORMALS.map(|offset| smooth.then(|| get_vec3(r, offset))),
    })
}

/// Material record as the tracer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    pub color: Vec3,
    pub emission: Vec3,
    pub specular: Vec3,
    pub specular_weight: f32,
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,
    pub triangle_range: Option<Range<u32>>,
}

/// Read material `id` back from an encoded buffer.
pub fn decode_material(buffer: &[f32], id: u32) -> Result<MaterialRecord> {
    let r = record(buffer, id, MATERIAL_STRIDE)?;
    let (start, end) = (r[MAT_RANGE_START], r[MAT_RANGE_END]);
    let triangle_range = (start >= 0.0 && end >= 0.0).then(|| start as u32..end as u32);
    Ok(MaterialRecord {
        color: get_vec3(r, MAT_COLOR),
        emission: get_vec3(r, MAT_EMISSION),
        specular: get_vec3(r, MAT_SPECULAR),
        specular_weight: r[MAT_SPECULAR_WEIGHT],
        aabb_min: get_vec3(r, MAT_AABB_MIN),
        aabb_max: get_vec3(r, MAT_AABB_MAX),
        triangle_range,
    })
}
