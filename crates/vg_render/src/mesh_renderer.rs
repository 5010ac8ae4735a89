//! Adaptive mesh renderer
//!
//! Tessellates every path of a drawing into one colored mesh. The flattening
//! tolerance follows a quality setting and the scale the mesh is shown at, so
//! output is rebuilt whenever the node transform changes.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vg_core::{
    Graphics, Mesh, MeshMaterial, Point, RenderContext, RenderedMesh, Renderer, Result, Texture,
};

use crate::raster;
use crate::tessellate;

/// Renders graphics as tessellated triangle meshes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshRenderer {
    quality: f32,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self { quality: 0.5 }
    }
}

impl MeshRenderer {
    /// Create a renderer; `quality` is clamped to `[0, 1]`
    pub fn new(quality: f32) -> Self {
        let mut renderer = Self::default();
        renderer.set_quality(quality);
        renderer
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn set_quality(&mut self, quality: f32) {
        self.quality = if quality.is_nan() {
            0.5
        } else {
            quality.clamp(0.0, 1.0)
        };
    }

    /// Flattening tolerance in path units for the given context
    pub fn tolerance(&self, ctx: &RenderContext) -> f32 {
        let scale = if ctx.scale > 0.0 { ctx.scale } else { 1.0 };
        let mut tolerance = 0.5 * 10f32.powf(-2.0 * self.quality) / scale;
        if ctx.high_quality {
            tolerance *= 0.5;
        }
        tolerance
    }
}

impl Renderer for MeshRenderer {
    fn class_name(&self) -> &'static str {
        "VGMeshRenderer"
    }

    fn render_mesh(&self, graphics: &Graphics, ctx: &RenderContext) -> Result<RenderedMesh> {
        let tolerance = self.tolerance(ctx);

        let mut mesh = Mesh::new();
        for path in graphics.paths() {
            mesh.append(&tessellate::tessellate_path(path, tolerance, tessellate::flat), [0.0; 3]);
        }
        let area = mesh.area();

        let material = if ctx.spatial {
            for v in &mut mesh.vertices {
                v.position = tessellate::spatial(Point::new(v.position[0], v.position[1]));
            }
            Some(MeshMaterial::spatial())
        } else {
            None
        };

        debug!(
            paths = graphics.num_paths(),
            triangles = mesh.triangle_count(),
            tolerance,
            spatial = ctx.spatial,
            "rendered mesh"
        );

        Ok(RenderedMesh {
            mesh,
            material,
            texture: None,
            area,
        })
    }

    fn render_texture(&self, graphics: &Graphics, ctx: &RenderContext) -> Result<Texture> {
        let scale = if ctx.high_quality {
            ctx.scale * 2.0
        } else {
            ctx.scale
        };
        Ok(raster::rasterize(graphics, scale)?)
    }

    fn is_dirty_on_transform_change(&self) -> bool {
        true
    }

    fn properties(&self) -> Vec<(&'static str, f32)> {
        vec![("quality", self.quality)]
    }
}
