//! Renderers for vector graphics
//!
//! [`MeshRenderer`] tessellates graphics into colored triangle meshes with
//! lyon and rasterizes them into textures with tiny-skia.
//!
//! # Example
//!
//! ```rust
//! use vg_core::{Color, Graphics, Path, RenderContext, Renderer, Subpath};
//! use vg_render::MeshRenderer;
//!
//! let mut path = Path::new().with_fill(Color::RED);
//! path.add_subpath(Subpath::ellipse(0.0, 0.0, 10.0, 10.0));
//!
//! let renderer = MeshRenderer::new(0.4);
//! let out = renderer
//!     .render_mesh(&Graphics::from_paths(vec![path]), &RenderContext::default())
//!     .unwrap();
//! assert!(!out.is_empty());
//! ```

mod error;
mod mesh_renderer;
pub mod raster;
pub mod tessellate;

pub use error::RenderError;
pub use mesh_renderer::MeshRenderer;
pub use raster::{rasterize, save_png};
