//! Error types for the playback engine

use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: every failure path leaves the engine in a
/// quiescent, consistent state.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The primary output slot is already held by another logical player
    #[error("Audio device is busy")]
    DeviceBusy,

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A stem set must contain at least one stem
    #[error("Stem set is empty")]
    EmptyStemSet,

    /// Audio sink error
    #[error("Audio sink error: {0}")]
    Sink(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
