//! svg_mesh
//!
//! Vector graphics module: SVG files become path nodes that render as
//! tessellated meshes. This crate ties the pieces together:
//!
//! - [`manifest`]: build hooks (`can_build`, `configure`, documented classes)
//! - [`registry`]: the classes exposed to the host engine
//! - re-exports of [`vg_core`], [`vg_render`] and [`vg_import`]

pub mod manifest;
pub mod registry;

pub use manifest::{
    can_build, configure, get_doc_classes, get_doc_path, BuildEnv, EnvValue, ModuleConfig,
    SvgMeshModule,
};
pub use registry::{
    register_svg_mesh_types, unregister_svg_mesh_types, ClassApi, ClassInfo, ClassRegistry,
};

pub use vg_core as core;
pub use vg_import as import;
pub use vg_render as render;
