//! Import error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vg_core::VgError;

/// Errors that can occur when importing SVG or Lottie files
#[derive(Error, Debug)]
pub enum ImportError {
    /// IO error when reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// SVG parsing error
    #[error("SVG parsing error: {0}")]
    Parse(String),

    /// The source file has no content
    #[error("empty source file: {}", .0.display())]
    EmptyFile(PathBuf),

    /// An import option has an unusable value
    #[error("invalid import option '{name}': {value}")]
    InvalidOption { name: &'static str, value: String },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Building the node tree failed
    #[error(transparent)]
    Scene(#[from] VgError),
}

pub type Result<T> = std::result::Result<T, ImportError>;
