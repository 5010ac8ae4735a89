//! SVG to 3D mesh scene importer
//!
//! Every SVG path is tessellated as a flat spatial mesh, placed at its center
//! (in meters, y up) and merged into one surface. Later paths sit slightly in
//! front of earlier ones so they win depth ties.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vg_core::{Graphics, Mesh, MeshMaterial, Rect, RenderContext, Renderer, Scene};
use vg_render::MeshRenderer;

use crate::error::Result;
use crate::import::{add_path_node, load_graphics, read_source, recentered_paths};
use crate::importer::SceneImporter;
use crate::options::ImportOptions;

/// Depth offset between consecutive paths
const LAYER_GAP: f32 = 1e-6 * 16.0;

/// Mesh node of an imported scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshInstance3D {
    pub name: String,
    pub mesh: Mesh,
    pub material: MeshMaterial,
    pub translation: [f32; 3],
}

/// Root of an imported scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportedScene {
    pub name: String,
    pub mesh_instance: MeshInstance3D,
}

/// Imports SVG files as a single merged 3D mesh
#[derive(Clone, Debug, Default)]
pub struct SceneImporterSvg {
    options: ImportOptions,
}

impl SceneImporterSvg {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Build the scene for SVG data
    pub fn import_data(&self, data: &[u8]) -> Result<ImportedScene> {
        self.merge_graphics(load_graphics(data, &self.options)?)
    }

    /// Render every path of `graphics` and merge the meshes
    pub fn merge_graphics(&self, graphics: Graphics) -> Result<ImportedScene> {
        let renderer = Arc::new(MeshRenderer::new(self.options.quality));
        let ctx = RenderContext::default().high_quality(true).spatial(true);

        let mut scene = Scene::new();
        let root_path = scene.create_path(vg_core::Path::new());
        scene.set_renderer(root_path, Some(renderer.clone()))?;

        let mut combined = Mesh::new();
        for (i, (path, center)) in recentered_paths(graphics).enumerate() {
            let node = add_path_node(&mut scene, root_path, path, center)?;
            let rendered = renderer.render_mesh(&scene.local_graphics(node)?, &ctx)?;
            if rendered.area.is_equal_approx(&Rect::ZERO) {
                debug!(index = i, "skipping path with empty area");
                continue;
            }
            let gap = i as f32 * LAYER_GAP;
            combined.append(&rendered.mesh, [center.x * 0.001, center.y * -0.001, gap]);
        }

        let size = combined.aabb().size();
        let translation = [-size[0] / 2.0, size[1] / 2.0, size[2]];
        debug!(
            triangles = combined.triangle_count(),
            ?translation,
            "merged svg meshes"
        );

        Ok(ImportedScene {
            name: "Node3D".to_string(),
            mesh_instance: MeshInstance3D {
                name: "MeshInstance3D".to_string(),
                mesh: combined,
                material: MeshMaterial::spatial(),
                translation,
            },
        })
    }
}

impl SceneImporter for SceneImporterSvg {
    fn extensions(&self) -> &'static [&'static str] {
        &["svg"]
    }

    fn import_scene(&self, path: &Path) -> Result<ImportedScene> {
        let data = read_source(path)?;
        let scene = self.import_data(&data)?;
        info!(
            source = %path.display(),
            vertices = scene.mesh_instance.mesh.vertices.len(),
            "imported svg as 3d scene"
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;

    const SVG: &str = r#"
        <svg xmlns="http://www.w3.org/2000/svg" width="512" height="256">
            <rect x="0" y="0" width="512" height="256" fill="white"/>
            <circle cx="256" cy="128" r="64" fill="red"/>
        </svg>
    "#;

    #[test]
    fn test_import_merges_paths() {
        let importer = SceneImporterSvg::default();
        assert_eq!(importer.options().quality, 0.4);
        let scene = importer.import_data(SVG.as_bytes()).unwrap();
        let instance = &scene.mesh_instance;

        assert_eq!(scene.name, "Node3D");
        assert_eq!(instance.material, MeshMaterial::spatial());
        assert!(!instance.mesh.is_empty());

        // background spans 0.512 x 0.256 meters centered on its own center
        let aabb = instance.mesh.aabb();
        let size = aabb.size();
        assert!((size[0] - 0.512).abs() < 1e-4);
        assert!((size[1] - 0.256).abs() < 1e-4);
        assert!((aabb.min[0]).abs() < 1e-4);
        assert!((aabb.max[1]).abs() < 1e-4);

        // the circle sits one layer in front of the background
        assert!((aabb.max[2] - LAYER_GAP).abs() < 1e-9);
        assert_eq!(
            instance.translation,
            [-size[0] / 2.0, size[1] / 2.0, size[2]]
        );
    }

    #[test]
    fn test_unpainted_paths_are_skipped_but_keep_their_layer() {
        let square = |x: f32, paint: bool| {
            let mut path = vg_core::Path::new();
            if paint {
                path = path.with_fill(vg_core::Color::RED);
            }
            path.add_subpath(vg_core::Subpath::rect(Rect::new(x, 0.0, 10.0, 10.0)));
            path
        };
        let graphics = Graphics::from_paths(vec![square(0.0, true), square(20.0, false), square(40.0, true)]);
        let scene = SceneImporterSvg::default().merge_graphics(graphics).unwrap();
        let mesh = &scene.mesh_instance.mesh;

        let layers: Vec<f32> = mesh.vertices.iter().map(|v| v.position[2]).collect();
        assert!(layers.iter().all(|&z| z == 0.0 || (z - 2.0 * LAYER_GAP).abs() < 1e-9));
        assert!(mesh.vertices.iter().all(|v| v.position[0] < 0.015 || v.position[0] > 0.035));
    }

    #[test]
    fn test_empty_file() {
        let path = std::env::temp_dir().join("vg_import_scene_empty.svg");
        std::fs::write(&path, "").unwrap();
        let err = SceneImporterSvg::default().import_scene(&path).unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile(_)));
        let _ = std::fs::remove_file(&path);
        assert!(SceneImporterSvg::default().recognizes(Path::new("x.svg")));
        assert!(!SceneImporterSvg::default().recognizes(Path::new("x.svgz")));
    }
}
