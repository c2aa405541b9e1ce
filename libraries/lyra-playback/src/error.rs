//! Error types for playback orchestration

use thiserror::Error;

/// Playback errors
///
/// These never reach the presentation layer: public orchestrator actions
/// log them and carry on.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Engine rejected a command
    #[error(transparent)]
    Engine(#[from] lyra_core::LyraError),

    /// Engine setup failed and no previous instance is holding it
    #[error("Engine setup failed: {0}")]
    Setup(String),

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
