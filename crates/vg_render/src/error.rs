//! Renderer error types

use thiserror::Error;
use vg_core::VgError;

/// Errors that can occur while turning graphics into meshes or images
#[derive(Error, Debug)]
pub enum RenderError {
    /// The target image could not be allocated
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    /// PNG encoding or writing failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<RenderError> for VgError {
    fn from(err: RenderError) -> Self {
        VgError::Render(err.to_string())
    }
}
