//! Importer interfaces
//!
//! A [`ResourceImporter`] converts a source file into saved resources; a
//! [`SceneImporter`] converts it into an in-memory 3D scene.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scene_importer::ImportedScene;

/// Converts source files into resources written next to `save_path`
pub trait ResourceImporter {
    fn importer_name(&self) -> &'static str;

    fn visible_name(&self) -> &'static str;

    /// Lowercase file extensions this importer accepts
    fn recognized_extensions(&self) -> &'static [&'static str];

    fn save_extension(&self) -> &'static str;

    fn resource_type(&self) -> &'static str;

    fn preset_count(&self) -> usize {
        0
    }

    /// Import `source`, returning every file written
    fn import(&self, source: &Path, save_path: &Path) -> Result<Vec<PathBuf>>;

    fn recognizes(&self, path: &Path) -> bool {
        matches_extension(path, self.recognized_extensions())
    }
}

/// Converts source files into 3D scenes
pub trait SceneImporter {
    fn extensions(&self) -> &'static [&'static str];

    fn import_scene(&self, path: &Path) -> Result<ImportedScene>;

    fn recognizes(&self, path: &Path) -> bool {
        matches_extension(path, self.extensions())
    }
}

/// Case-insensitive extension check
pub fn matches_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_extension() {
        assert!(matches_extension(Path::new("a/b.SVG"), &["svg", "svgz"]));
        assert!(matches_extension(Path::new("b.svgz"), &["svg", "svgz"]));
        assert!(!matches_extension(Path::new("b.png"), &["svg"]));
        assert!(!matches_extension(Path::new("svg"), &["svg"]));
    }
}
