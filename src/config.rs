//! Build configuration: buffer dimensions, SAH costs, normal smoothing.
//!
//! Persisted as JSON under the user config directory
//! (`<config_dir>/ptscene/config.json`). Missing or unreadable files fall back
//! to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bvh::SahCosts;
use crate::gpu::BufferLayout;
use crate::scene::DEFAULT_SMOOTH_ANGLE;
use crate::util::Result;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Texture dimensions shared by all three buffers
    pub layout: BufferLayout,
    pub costs: SahCosts,
    pub smooth_angle: f32, // 0-180 degrees
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            layout: BufferLayout::default(),
            costs: SahCosts::default(),
            smooth_angle: DEFAULT_SMOOTH_ANGLE,
        }
    }
}

impl BuildConfig {
    /// Default config file location.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("ptscene");
            p.push("config.json");
            p
        })
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str::<Self>(&s).ok())
            .unwrap_or_default()
            .validated()
    }

    /// Load from an explicit file. Unlike [`BuildConfig::load`], errors are reported.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config.validated())
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Replace out-of-range values with defaults.
    fn validated(mut self) -> Self {
        if !self.layout.is_valid() {
            tracing::warn!(layout = ?self.layout, "invalid buffer layout, using default");
            self.layout = BufferLayout::default();
        }
        if !(0.0..=180.0).contains(&self.smooth_angle) {
            self.smooth_angle = DEFAULT_SMOOTH_ANGLE;
        }
        if !(self.costs.triangle >= 0.0 && self.costs.aabb >= 0.0) {
            self.costs = SahCosts::default();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = BuildConfig {
            layout: BufferLayout::new(64, 32),
            costs: SahCosts {
                triangle: 3.0,
                aabb: 0.5,
            },
            smooth_angle: 30.0,
        };
        config.save_to(&path).unwrap();
        assert_eq!(BuildConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "layout": { "width": 8 } }"#).unwrap();
        let config = BuildConfig::load_from(&path).unwrap();
        assert_eq!(config.layout, BufferLayout::new(8, 1024));
        assert_eq!(config.costs, SahCosts::default());
        assert_eq!(config.smooth_angle, DEFAULT_SMOOTH_ANGLE);
    }

    #[test]
    fn test_oversized_layout_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "layout": { "width": 8192, "height": 4096 } }"#).unwrap();
        let config = BuildConfig::load_from(&path).unwrap();
        assert_eq!(config.layout, BufferLayout::default());

        std::fs::write(&path, r#"{ "layout": { "width": 4096, "height": 4096 } }"#).unwrap();
        let config = BuildConfig::load_from(&path).unwrap();
        assert_eq!(config.layout, BufferLayout::new(4096, 4096));
    }

    #[test]
    fn test_invalid_values_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "layout": { "width": 0, "height": 4 }, "smooth_angle": 400 }"#,
        )
        .unwrap();
        let config = BuildConfig::load_from(&path).unwrap();
        assert_eq!(config.layout, BufferLayout::default());
        assert_eq!(config.smooth_angle, DEFAULT_SMOOTH_ANGLE);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BuildConfig::load_from(dir.path().join("nope.json")).is_err());
    }
}
