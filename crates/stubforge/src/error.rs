/// Error types for the stub generator

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("packaging failed for {path}: {reason}")]
    Package { path: PathBuf, reason: String },

    #[error("duplicate resource name: {0}")]
    DuplicateResource(String),

    #[error("module compilation failed: {0}")]
    Compile(String),

    #[error("emission failed: {0}")]
    Emit(String),

    #[error(transparent)]
    Image(#[from] stubforge_image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn config(message: impl Into<String>) -> Self {
        BuildError::Config(message.into())
    }

    pub fn package(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BuildError::Package {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
