//! SVG to path node conversion

use std::fs;
use std::path::Path as FilePath;

use tracing::debug;
use vg_core::{Affine2D, Graphics, NodeId, Path, Point, Scene};

use crate::document::{normalize_graphics, SvgDocument};
use crate::error::{ImportError, Result};
use crate::options::ImportOptions;

/// Parse SVG data and scale it up to the target size
pub fn load_graphics(data: &[u8], options: &ImportOptions) -> Result<Graphics> {
    let mut graphics = SvgDocument::from_data(data, options)?.graphics();
    let scale = normalize_graphics(&mut graphics, options.target_size);
    debug!(paths = graphics.num_paths(), scale, "loaded svg graphics");
    Ok(graphics)
}

/// Read an SVG file, rejecting empty files
pub fn read_source(path: &FilePath) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    if data.is_empty() {
        return Err(ImportError::EmptyFile(path.to_path_buf()));
    }
    Ok(data)
}

/// Move every path so its bounds center is the origin.
///
/// Yields each path with the center it was moved from.
pub fn recentered_paths(graphics: Graphics) -> impl Iterator<Item = (Path, Point)> {
    graphics.into_paths().into_iter().map(|mut path| {
        let center = path.center();
        path.transform(&Affine2D::translation(-center.x, -center.y), false);
        (path, center)
    })
}

/// Node name for an imported path: its id, or "Path"
pub fn path_node_name(path: &Path) -> String {
    if path.name.is_empty() {
        "Path".to_string()
    } else {
        path.name.clone()
    }
}

/// Create a path node at `center` below `parent`
pub fn add_path_node(
    scene: &mut Scene,
    parent: NodeId,
    path: Path,
    center: Point,
) -> Result<NodeId> {
    let name = path_node_name(&path);
    let id = scene.create_path(path);
    scene.set_name(id, name)?;
    scene.set_position(id, center)?;
    scene.add_child(parent, id, true)?;
    Ok(id)
}

/// Import SVG data as path nodes below `parent`.
///
/// Every SVG path becomes one child positioned at its bounds center.
pub fn import_svg(
    scene: &mut Scene,
    parent: NodeId,
    data: &[u8],
    options: &ImportOptions,
) -> Result<Vec<NodeId>> {
    let graphics = load_graphics(data, options)?;
    recentered_paths(graphics)
        .map(|(path, center)| add_path_node(scene, parent, path, center))
        .collect()
}

/// [`import_svg`] for a file on disk
pub fn import_svg_file(
    scene: &mut Scene,
    parent: NodeId,
    path: impl AsRef<FilePath>,
    options: &ImportOptions,
) -> Result<Vec<NodeId>> {
    let data = read_source(path.as_ref())?;
    import_svg(scene, parent, &data, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SHAPES: &str = r#"
        <svg xmlns="http://www.w3.org/2000/svg" width="512" height="512">
            <rect id="left" x="0" y="0" width="100" height="100" fill="red"/>
            <circle cx="300" cy="300" r="50" fill="blue"/>
            <circle cx="400" cy="400" r="10" fill="green"/>
        </svg>
    "#;

    #[test]
    fn test_import_creates_recentered_children() {
        let mut scene = Scene::new();
        let parent = scene.create_default_path();
        scene.add_child(scene.root(), parent, true).unwrap();

        let ids = import_svg(&mut scene, parent, TWO_SHAPES.as_bytes(), &ImportOptions::default())
            .unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(scene.children(parent), ids.as_slice());

        let names: Vec<&str> = ids.iter().map(|&id| scene.name(id).unwrap()).collect();
        assert_eq!(names, vec!["left", "Path", "Path2"]);

        assert!(scene.position(ids[0]).unwrap().is_equal_approx(Point::new(50.0, 50.0)));
        assert!(scene.position(ids[1]).unwrap().distance(Point::new(300.0, 300.0)) < 0.01);
        for &id in &ids {
            assert!(scene.path(id).unwrap().center().distance(Point::ZERO) < 0.01);
        }
    }

    #[test]
    fn test_small_drawings_are_scaled_up() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
            <rect x="0" y="0" width="16" height="8" fill="red"/></svg>"#;
        let graphics = load_graphics(svg.as_bytes(), &ImportOptions::default()).unwrap();
        assert!((graphics.bounds().width() - 256.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let path = std::env::temp_dir().join("vg_import_empty_source.svg");
        fs::write(&path, b"").unwrap();
        let mut scene = Scene::new();
        let root = scene.root();
        let err = import_svg_file(&mut scene, root, &path, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::EmptyFile(_)));
        let _ = fs::remove_file(&path);
    }
}
