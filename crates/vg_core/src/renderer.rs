//! The renderer seam
//!
//! A [`Renderer`] turns [`Graphics`] into something a host can draw: a
//! triangle mesh or a texture. Path nodes either own a renderer or inherit
//! the nearest one above them.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::graphics::Graphics;
use crate::mesh::{RenderedMesh, Texture};

/// Per-call rendering parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    /// Scale from path units to output units (the node's global scale)
    pub scale: f32,
    /// Spend more effort on precision
    pub high_quality: bool,
    /// Produce a 3D mesh instead of a 2D one
    pub spatial: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            scale: 1.0,
            high_quality: false,
            spatial: false,
        }
    }
}

impl RenderContext {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    pub fn high_quality(mut self, high_quality: bool) -> Self {
        self.high_quality = high_quality;
        self
    }

    pub fn spatial(mut self, spatial: bool) -> Self {
        self.spatial = spatial;
        self
    }
}

/// Converts graphics into meshes or textures
pub trait Renderer: fmt::Debug + Send + Sync {
    /// Registered class name of the renderer
    fn class_name(&self) -> &'static str;

    fn render_mesh(&self, graphics: &Graphics, ctx: &RenderContext) -> Result<RenderedMesh>;

    fn render_texture(&self, graphics: &Graphics, ctx: &RenderContext) -> Result<Texture>;

    /// Whether nodes should be materialized as sprites rather than meshes
    fn prefer_sprite(&self) -> bool {
        false
    }

    /// Whether output depends on the node transform
    fn is_dirty_on_transform_change(&self) -> bool {
        false
    }

    /// Settings saved with a scene and handed back when it is loaded
    fn properties(&self) -> Vec<(&'static str, f32)> {
        Vec::new()
    }
}

pub type SharedRenderer = Arc<dyn Renderer>;
