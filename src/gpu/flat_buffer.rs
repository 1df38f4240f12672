//! Fixed-capacity scalar buffers fed to the tracer as RGBA32F textures.

use serde::{Deserialize, Serialize};

use crate::util::{Error, Result};

/// Scalars per texel (the tracer reads 4 at a time).
pub const TEXEL: usize = 4;

/// Indices stored as `f32` stay exact below this bound.
pub const MAX_EXACT_INDEX: usize = 1 << 24;

/// Texture dimensions backing every flat buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferLayout {
    pub width: u32,
    pub height: u32,
}

impl Default for BufferLayout {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

impl BufferLayout {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total scalar capacity, `width * height * 4`.
    pub fn capacity(&self) -> usize {
        self.width as usize * self.height as usize * TEXEL
    }

    /// Non-empty, and every texel index is exact as an `f32`.
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.width as usize * self.height as usize <= MAX_EXACT_INDEX
    }
}

/// Flat `f32` buffer that never grows past its capacity.
///
/// Storage grows lazily as records are written; unwritten scalars read as
/// zero. Writing past the capacity is an error, never a truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBuffer {
    label: &'static str,
    data: Vec<f32>,
    capacity: usize,
}

impl FlatBuffer {
    pub fn new(label: &'static str, capacity: usize) -> Self {
        Self {
            label,
            data: Vec::new(),
            capacity,
        }
    }

    pub fn with_layout(label: &'static str, layout: BufferLayout) -> Self {
        Self::new(label, layout.capacity())
    }

    /// Fail unless `required` scalars fit.
    pub fn ensure_fits(&self, required: usize) -> Result<()> {
        if required > self.capacity {
            return Err(Error::capacity(self.label, required, self.capacity));
        }
        Ok(())
    }

    /// Write one scalar.
    pub fn set(&mut self, index: usize, value: f32) -> Result<()> {
        self.write(index, &[value])
    }

    /// Write `values` starting at `offset`.
    pub fn write(&mut self, offset: usize, values: &[f32]) -> Result<()> {
        let end = offset
            .checked_add(values.len())
            .ok_or_else(|| Error::capacity(self.label, usize::MAX, self.capacity))?;
        self.ensure_fits(end)?;
        if end > self.data.len() {
            self.data.resize(end, 0.0);
        }
        self.data[offset..end].copy_from_slice(values);
        Ok(())
    }

    /// Scalar at `index`; zero if never written, `None` past capacity.
    pub fn get(&self, index: usize) -> Option<f32> {
        (index < self.capacity).then(|| self.data.get(index).copied().unwrap_or(0.0))
    }

    /// The four scalars of texel `index`, as the tracer reads them.
    pub fn texel(&self, index: usize) -> Option<[f32; TEXEL]> {
        let base = index.checked_mul(TEXEL)?;
        Some([
            self.get(base)?,
            self.get(base + 1)?,
            self.get(base + 2)?,
            self.get(base + 3)?,
        ])
    }

    /// Written prefix.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Written prefix as raw bytes (native endian).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Full texture contents, zero-padded to the capacity.
    pub fn to_texture(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.capacity);
        out.extend_from_slice(&self.data);
        out.resize(self.capacity, 0.0);
        out
    }

    /// Scalars written so far (high-water mark).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}
