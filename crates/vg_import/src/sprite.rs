//! Vector sprite creation from resource paths

use std::sync::Arc;

use vg_core::{NodeId, Path, Scene, SharedRenderer};
use vg_render::MeshRenderer;

use crate::error::Result;

/// Node created for a dropped resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorSprite {
    /// Empty path node with a mesh renderer, ready to receive the SVG
    Path(NodeId),
    /// Plain sprite for non-vector resources
    Sprite(NodeId),
}

impl VectorSprite {
    pub fn node(&self) -> NodeId {
        match *self {
            VectorSprite::Path(id) | VectorSprite::Sprite(id) => id,
        }
    }
}

/// Create a detached path node with a mesh renderer for `.svg` resources
pub fn create_from_svg(scene: &mut Scene, resource_path: &str) -> Result<Option<NodeId>> {
    if !resource_path.ends_with(".svg") {
        return Ok(None);
    }

    let root = scene.create_path(Path::new());
    let renderer: SharedRenderer = Arc::new(MeshRenderer::default());
    scene.set_renderer(root, Some(renderer))?;
    Ok(Some(root))
}

/// [`create_from_svg`], falling back to a sprite node for other resources
pub fn create_vector_sprite(scene: &mut Scene, resource_path: &str) -> Result<VectorSprite> {
    Ok(match create_from_svg(scene, resource_path)? {
        Some(id) => VectorSprite::Path(id),
        None => VectorSprite::Sprite(scene.create_node_2d("Sprite2D")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_resources_get_a_path_node() {
        let mut scene = Scene::new();
        let id = create_from_svg(&mut scene, "res://icons/star.svg").unwrap().unwrap();
        assert!(scene.is_path(id));
        assert!(scene.is_path_empty(id).unwrap());
        assert_eq!(
            scene.renderer(id).unwrap().unwrap().class_name(),
            "VGMeshRenderer"
        );
        assert!(create_from_svg(&mut scene, "res://icons/star.png").unwrap().is_none());
    }

    #[test]
    fn test_other_resources_fall_back_to_sprite() {
        let mut scene = Scene::new();
        let sprite = create_vector_sprite(&mut scene, "res://logo.png").unwrap();
        assert!(matches!(sprite, VectorSprite::Sprite(_)));
        assert_eq!(scene.name(sprite.node()).unwrap(), "Sprite2D");

        let path = create_vector_sprite(&mut scene, "res://logo.svg").unwrap();
        assert!(matches!(path, VectorSprite::Path(_)));
    }
}
