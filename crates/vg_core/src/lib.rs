//! Vector graphics core
//!
//! This crate holds the data model shared by the renderers and importers:
//!
//! - **Geometry**: points, rects and 2D affine transforms
//! - **Paints**: solid colors plus linear and radial gradients over a color ramp
//! - **Paths**: subpaths stored as cubic control polygons, with fill and line style
//! - **Scene**: an arena of nodes where path nodes inherit renderers and cache
//!   their mesh representation
//!
//! # Example
//!
//! ```rust
//! use vg_core::{Color, PathBuilder, Scene};
//!
//! let path = PathBuilder::new()
//!     .move_to(0.0, 0.0)
//!     .line_to(10.0, 0.0)
//!     .line_to(10.0, 10.0)
//!     .close()
//!     .build();
//!
//! let mut scene = Scene::new();
//! let node = scene.create_path(path.with_fill(Color::RED));
//! scene.add_child(scene.root(), node, true).unwrap();
//! assert_eq!(scene.num_subpaths(node).unwrap(), 1);
//! ```

pub mod builder;
pub mod color;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod mesh;
pub mod paint;
pub mod path;
pub mod renderer;
pub mod scene;

pub use builder::PathBuilder;
pub use color::Color;
pub use error::{Result, VgError};
pub use geometry::{Affine2D, Point, Rect, Size};
pub use graphics::Graphics;
pub use mesh::{Aabb, Mesh, MeshMaterial, MeshVertex, RenderedMesh, Texture};
pub use paint::{ColorRamp, GradientStop, LinearGradient, Paint, RadialGradient, Spread};
pub use path::{FillRule, LineCap, LineJoin, Path, Subpath};
pub use renderer::{RenderContext, Renderer, SharedRenderer};
pub use scene::{
    MeshNode, Node, NodeId, NodeKind, NodeSnapshot, Notification, PathNode, PropertyInfo,
    PropertyKind, PropertyValue, RendererSnapshot, Scene, SceneSnapshot,
};
