//! SVG to packed path-node scene importer

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};
use vg_core::{NodeId, Scene, SceneSnapshot, SharedRenderer};
use vg_render::MeshRenderer;

use crate::error::Result;
use crate::import::{add_path_node, load_graphics, read_source, recentered_paths};
use crate::importer::ResourceImporter;
use crate::options::ImportOptions;

/// Imports SVG files as a saved scene: `Node2D` → `VGPath` (mesh renderer)
/// → one path node per SVG path
#[derive(Clone, Debug)]
pub struct SvgPathImporter {
    options: ImportOptions,
}

impl Default for SvgPathImporter {
    fn default() -> Self {
        Self {
            options: ImportOptions::packed_scene(),
        }
    }
}

impl SvgPathImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Build the scene for SVG data; returns the scene and its top node
    pub fn build_scene(&self, data: &[u8]) -> Result<(Scene, NodeId)> {
        let graphics = load_graphics(data, &self.options)?;

        let mut scene = Scene::new();
        let root = scene.create_node_2d("Node2D");
        let root_path = scene.create_path(vg_core::Path::new());
        scene.add_child(root, root_path, true)?;
        let renderer: SharedRenderer = Arc::new(MeshRenderer::new(self.options.quality));
        scene.set_renderer(root_path, Some(renderer))?;

        for (path, center) in recentered_paths(graphics) {
            add_path_node(&mut scene, root_path, path, center)?;
        }
        debug!(nodes = scene.len(), "built packed scene");
        Ok((scene, root))
    }
}

impl ResourceImporter for SvgPathImporter {
    fn importer_name(&self) -> &'static str {
        "svgvgpath"
    }

    fn visible_name(&self) -> &'static str {
        "SVGVGPath"
    }

    fn recognized_extensions(&self) -> &'static [&'static str] {
        &["svg", "svgz"]
    }

    fn save_extension(&self) -> &'static str {
        "scn"
    }

    fn resource_type(&self) -> &'static str {
        "PackedScene"
    }

    fn import(&self, source: &Path, save_path: &Path) -> Result<Vec<PathBuf>> {
        let data = read_source(source)?;
        let (scene, root) = self.build_scene(&data)?;
        let snapshot = scene.snapshot(root)?;

        let mut target = save_path.as_os_str().to_owned();
        target.push(".");
        target.push(self.save_extension());
        let target = PathBuf::from(target);

        fs::write(&target, serde_json::to_vec_pretty(&snapshot)?)?;
        info!(source = %source.display(), target = %target.display(), "imported svg scene");
        Ok(vec![target])
    }
}

/// Load a saved scene below a detached top node, restoring mesh renderers
pub fn load_packed_scene(scene: &mut Scene, path: impl AsRef<Path>) -> Result<NodeId> {
    let data = fs::read(path)?;
    let snapshot: SceneSnapshot = serde_json::from_slice(&data)?;
    let top = scene.instantiate(&snapshot, |saved| {
        (saved.class == "VGMeshRenderer").then(|| {
            let quality = saved
                .property("quality")
                .unwrap_or_else(|| MeshRenderer::default().quality());
            Arc::new(MeshRenderer::new(quality)) as SharedRenderer
        })
    })?;
    Ok(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vg_core::Renderer;

    const SVG: &str = r#"
        <svg xmlns="http://www.w3.org/2000/svg" width="64" height="64">
            <rect id="a" x="0" y="0" width="32" height="32" fill="red"/>
            <rect id="b" x="32" y="32" width="32" height="32" fill="blue"/>
        </svg>
    "#;

    #[test]
    fn test_importer_metadata() {
        let importer = SvgPathImporter::default();
        assert_eq!(importer.importer_name(), "svgvgpath");
        assert_eq!(importer.visible_name(), "SVGVGPath");
        assert_eq!(importer.recognized_extensions(), &["svg", "svgz"]);
        assert_eq!(importer.save_extension(), "scn");
        assert_eq!(importer.resource_type(), "PackedScene");
        assert_eq!(importer.preset_count(), 0);
        assert_eq!(importer.options().dpi, 100.0);
        assert!(importer.recognizes(Path::new("icon.svgz")));
    }

    #[test]
    fn test_build_scene_layout() {
        let (scene, root) = SvgPathImporter::default().build_scene(SVG.as_bytes()).unwrap();
        let root_path = scene.children(root)[0];
        assert_eq!(scene.name(root_path).unwrap(), "VGPath");
        assert_eq!(
            scene.renderer(root_path).unwrap().unwrap().class_name(),
            "VGMeshRenderer"
        );

        let children = scene.children(root_path);
        assert_eq!(children.len(), 2);
        // 64px drawing is scaled by 4 to reach 256
        let b = children[1];
        assert_eq!(scene.name(b).unwrap(), "b");
        assert!(scene.position(b).unwrap().distance(vg_core::Point::new(192.0, 192.0)) < 1e-3);
        assert!(scene.inherits_renderer(b).unwrap());
    }

    #[test]
    fn test_import_writes_scene_file() {
        let dir = std::env::temp_dir();
        let source = dir.join("vg_import_packed_source.svg");
        let save_path = dir.join("vg_import_packed_target");
        fs::write(&source, SVG).unwrap();

        let files = SvgPathImporter::default().import(&source, &save_path).unwrap();
        assert_eq!(files, vec![dir.join("vg_import_packed_target.scn")]);

        let mut scene = Scene::new();
        let top = load_packed_scene(&mut scene, &files[0]).unwrap();
        let root_path = scene.children(top)[0];
        assert!(scene.renderer(root_path).unwrap().is_some());
        assert_eq!(scene.children(root_path).len(), 2);

        let _ = fs::remove_file(&source);
        let _ = fs::remove_file(&files[0]);
    }

    #[test]
    fn test_packed_scene_keeps_renderer_quality() {
        let dir = std::env::temp_dir();
        let source = dir.join("vg_import_packed_quality.svg");
        let save_path = dir.join("vg_import_packed_quality");
        fs::write(&source, SVG).unwrap();

        let importer = SvgPathImporter::new(ImportOptions {
            quality: 0.4,
            ..ImportOptions::packed_scene()
        });
        let files = importer.import(&source, &save_path).unwrap();

        let mut scene = Scene::new();
        let top = load_packed_scene(&mut scene, &files[0]).unwrap();
        let root_path = scene.children(top)[0];
        let renderer = scene.renderer(root_path).unwrap().unwrap();
        assert_eq!(renderer.properties(), vec![("quality", 0.4)]);

        let _ = fs::remove_file(&source);
        let _ = fs::remove_file(&files[0]);
    }

    #[test]
    fn test_empty_source_fails() {
        let source = std::env::temp_dir().join("vg_import_packed_empty.svg");
        fs::write(&source, "").unwrap();
        let result = SvgPathImporter::default().import(&source, Path::new("unused"));
        assert!(result.is_err());
        let _ = fs::remove_file(&source);
    }
}
