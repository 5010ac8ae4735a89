//! SVG and Lottie importers
//!
//! This crate loads SVG files with `usvg` and turns them into path nodes or
//! merged 3D meshes:
//!
//! - [`import_svg`] adds one recentered path node per SVG path below a node
//! - [`SvgPathImporter`] saves a `Node2D` → `VGPath` scene as JSON
//! - [`SceneImporterSvg`] renders all paths into one spatial mesh
//!
//! # Example
//!
//! ```ignore
//! use vg_core::Scene;
//! use vg_import::{import_svg_file, ImportOptions};
//!
//! let mut scene = Scene::new();
//! let root = scene.create_default_path();
//! let nodes = import_svg_file(&mut scene, root, "icon.svg", &ImportOptions::default())?;
//! ```

mod document;
mod error;
mod import;
mod importer;
mod lottie;
mod options;
mod path;
mod scene_importer;
mod sprite;
mod style;
mod vgpath_importer;

pub use document::{normalize_graphics, SvgDocument};
pub use error::{ImportError, Result};
pub use import::{import_svg, import_svg_file, load_graphics, recentered_paths};
pub use importer::{matches_extension, ResourceImporter, SceneImporter};
pub use lottie::{LottieComposition, LottieFonts, LottieLoader, LottieMarker};
pub use options::{ImportOptions, Units};
pub use scene_importer::{ImportedScene, MeshInstance3D, SceneImporterSvg};
pub use sprite::{create_from_svg, create_vector_sprite, VectorSprite};
pub use vgpath_importer::{load_packed_scene, SvgPathImporter};
