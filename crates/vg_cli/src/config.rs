//! svgmesh configuration file handling
//!
//! Settings live in `svgmesh.toml`. Without an `[import]` table the packed
//! scene import runs at 100 dpi and the other commands at 96 dpi:
//!
//! ```toml
//! [import]
//! units = "mm"
//! dpi = 96.0
//! target_size = 256.0
//! quality = 0.4
//!
//! [render]
//! quality = 0.5
//! scale = 1.0
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use svg_mesh::import::ImportOptions;

pub const CONFIG_FILE: &str = "svgmesh.toml";

/// Contents of `svgmesh.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SvgMeshConfig {
    /// When absent each importer keeps its own defaults
    #[serde(default)]
    pub import: Option<ImportOptions>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Renderer settings
#[derive(Debug, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Mesh renderer quality in `[0, 1]`
    #[serde(default = "default_quality")]
    pub quality: f32,
    /// Pixels per unit for textures
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_quality() -> f32 {
    0.5
}

fn default_scale() -> f32 {
    1.0
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            scale: default_scale(),
        }
    }
}

impl SvgMeshConfig {
    /// Load an explicit config file, or `svgmesh.toml` from `dir` when present
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Options for the packed-scene importer (100 dpi unless configured)
    pub fn packed_scene_options(&self) -> ImportOptions {
        self.import.clone().unwrap_or_else(ImportOptions::packed_scene)
    }

    /// Options for the mesh scene importer and texture export
    pub fn import_options(&self) -> ImportOptions {
        self.import.clone().unwrap_or_default()
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: SvgMeshConfig = toml::from_str(content)?;
        if let Some(import) = &config.import {
            import.validate()?;
        }
        if !(config.render.scale > 0.0) {
            anyhow::bail!("render.scale must be positive, got {}", config.render.scale);
        }
        Ok(config)
    }
}
