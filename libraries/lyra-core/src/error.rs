/// Core error types for Lyra
use thiserror::Error;

/// Result type alias using `LyraError`
pub type Result<T> = std::result::Result<T, LyraError>;

/// Core error type for Lyra
#[derive(Error, Debug)]
pub enum LyraError {
    /// Audio engine rejected a command
    #[error("Engine error: {0}")]
    Engine(String),

    /// Engine was used before setup completed
    #[error("Engine not initialized")]
    NotInitialized,

    /// Media permission missing or revoked
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl LyraError {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
