//! Error types shared by the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for scene-lab operations
pub type Result<T> = std::result::Result<T, SceneLabError>;

/// Errors that can occur while setting up or driving the viewer
#[derive(Error, Debug)]
pub enum SceneLabError {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Texture {path}: {message}")]
    Texture { path: PathBuf, message: String },

    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneLabError {
    pub fn texture(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SceneLabError::Texture {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
