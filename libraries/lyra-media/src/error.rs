//! Error types for media sources

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid page cursor: {0}")]
    InvalidCursor(String),

    #[error("Scan task failed: {0}")]
    Task(String),
}

impl From<MediaError> for lyra_core::LyraError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Io(e) => Self::Io(e),
            MediaError::Permission(msg) => Self::Permission(msg),
            MediaError::InvalidCursor(msg) => Self::InvalidInput(msg),
            other => Self::Other(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
