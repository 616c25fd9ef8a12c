//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the astrobloom crate.
#[derive(Debug)]
pub enum AppError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// WGSL composition failure (missing module, parse or validation error).
    Shader(String),
    /// Failed to decode a texture image.
    Texture(image::ImageError),
    /// Failed to import a glTF/GLB model.
    Model(gltf::Error),
    /// A model primitive carried no vertex positions.
    MissingPositions(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Texture(e) => write!(f, "texture decode error: {e}"),
            Self::Model(e) => write!(f, "model import error: {e}"),
            Self::MissingPositions(mesh) => {
                write!(f, "mesh '{mesh}' has no position data")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Texture(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for AppError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        Self::Texture(e)
    }
}

impl From<gltf::Error> for AppError {
    fn from(e: gltf::Error) -> Self {
        Self::Model(e)
    }
}
