//! svgmesh CLI
//!
//! Import SVG drawings as path scenes, merged meshes and textures.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use svg_mesh::core::{RenderContext, Renderer};
use svg_mesh::import::{
    LottieLoader, ResourceImporter, SceneImporter, SceneImporterSvg, SvgDocument, SvgPathImporter,
};
use svg_mesh::render::{save_png, MeshRenderer};
use svg_mesh::{get_doc_classes, get_doc_path, register_svg_mesh_types, ClassApi};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::SvgMeshConfig;

#[derive(Parser)]
#[command(name = "svgmesh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vector graphics import tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./svgmesh.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an SVG file as a path scene
    Import {
        /// SVG file
        source: PathBuf,

        /// Save path, without extension (defaults to the source stem)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an SVG file as a single 3D mesh and write it as JSON
    Scene {
        /// SVG file
        source: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rasterize an SVG file to PNG
    Texture {
        /// SVG file
        source: PathBuf,

        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,

        /// Pixels per unit (overrides render.scale)
        #[arg(short, long)]
        scale: Option<f32>,

        /// Render at twice the scale
        #[arg(long)]
        high_quality: bool,
    },

    /// List the classes the module registers
    Classes {
        /// Leave out editor classes
        #[arg(long)]
        no_tools: bool,
    },

    /// Show the header of a Lottie animation
    Lottie {
        /// Lottie JSON file
        source: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let config = SvgMeshConfig::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Import { source, output } => cmd_import(&config, &source, output),
        Commands::Scene { source, output } => cmd_scene(&config, &source, output.as_deref()),
        Commands::Texture {
            source,
            output,
            scale,
            high_quality,
        } => cmd_texture(&config, &source, &output, scale, high_quality),
        Commands::Classes { no_tools } => cmd_classes(!no_tools),
        Commands::Lottie { source } => cmd_lottie(&source),
    }
}

fn cmd_import(config: &SvgMeshConfig, source: &Path, output: Option<PathBuf>) -> Result<()> {
    let importer = SvgPathImporter::new(config.packed_scene_options());
    if !importer.recognizes(source) {
        anyhow::bail!(
            "'{}' is not one of {:?}",
            source.display(),
            importer.recognized_extensions()
        );
    }

    let save_path = output.unwrap_or_else(|| source.with_extension(""));
    let written = importer
        .import(source, &save_path)
        .with_context(|| format!("Failed to import {}", source.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn cmd_scene(config: &SvgMeshConfig, source: &Path, output: Option<&Path>) -> Result<()> {
    let importer = SceneImporterSvg::new(config.import_options());
    let scene = importer
        .import_scene(source)
        .with_context(|| format!("Failed to import {}", source.display()))?;

    let mesh = &scene.mesh_instance.mesh;
    info!(
        "Merged {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangle_count()
    );

    let json = serde_json::to_string_pretty(&scene)?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_texture(
    config: &SvgMeshConfig,
    source: &Path,
    output: &Path,
    scale: Option<f32>,
    high_quality: bool,
) -> Result<()> {
    let scale = scale.unwrap_or(config.render.scale);
    if !(scale > 0.0) {
        anyhow::bail!("Scale must be positive, got {}", scale);
    }

    let document = SvgDocument::from_file(source, &config.import_options())
        .with_context(|| format!("Failed to load {}", source.display()))?;
    let renderer = MeshRenderer::new(config.render.quality);
    let ctx = RenderContext::new(scale).high_quality(high_quality);
    let texture = renderer.render_texture(&document.graphics(), &ctx)?;

    save_png(&texture, output).with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {}x{} texture to {}",
        texture.width,
        texture.height,
        output.display()
    );
    Ok(())
}

fn cmd_classes(tools_enabled: bool) -> Result<()> {
    let registry = register_svg_mesh_types(tools_enabled);
    for class in registry.iter() {
        let mut flags = Vec::new();
        if class.is_abstract {
            flags.push("abstract");
        }
        if class.api == ClassApi::Editor {
            flags.push("editor");
        }
        if flags.is_empty() {
            println!("{} : {}", class.name, class.parent);
        } else {
            println!("{} : {} ({})", class.name, class.parent, flags.join(", "));
        }
    }

    let undocumented: Vec<&str> = registry
        .iter()
        .map(|c| c.name)
        .filter(|name| !get_doc_classes().contains(name))
        .collect();
    if !undocumented.is_empty() {
        tracing::warn!("Classes without documentation: {:?}", undocumented);
    }
    info!("Class reference lives in {}/", get_doc_path());
    Ok(())
}

fn cmd_lottie(source: &Path) -> Result<()> {
    let loader = LottieLoader;
    if !loader.recognize_path(source) {
        anyhow::bail!(
            "'{}' does not have the .{} extension",
            source.display(),
            LottieLoader::EXTENSION
        );
    }

    let composition = loader
        .load(source)
        .with_context(|| format!("Failed to load {}", source.display()))?;
    let bounds = composition.bounds();

    println!("name:     {}", composition.name);
    println!("version:  {}", composition.version);
    println!("size:     {} x {}", bounds.width(), bounds.height());
    println!(
        "duration: {} frames at {} fps ({:.2}s)",
        composition.duration_frames(),
        composition.frame_rate,
        composition.duration_seconds()
    );
    println!(
        "contents: {} layers, {} assets, {} fonts, {} chars",
        composition.layer_count(),
        composition.asset_count(),
        composition.font_count(),
        composition.char_count()
    );
    for marker in &composition.markers {
        println!("marker:   {} @ {} (+{})", marker.name, marker.start_frame, marker.duration_frames);
    }
    Ok(())
}
