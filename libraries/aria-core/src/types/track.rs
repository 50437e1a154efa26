/// Track descriptor handed to the playback engine
use serde::{Deserialize, Serialize};

/// Playable track descriptor
///
/// Produced by external collaborators (generation results, library
/// records). The engine never mutates a `Track`; it is removed from the
/// queue as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Opaque unique identifier from the backend
    pub id: String,

    /// Audio source locator (URL or path), resolved by external I/O
    pub audio_url: String,

    /// Track title (presentation only)
    pub title: String,

    /// Duration in seconds. Authoritative only until the audio device
    /// reports an actual decoded duration, which then takes precedence.
    pub duration: f64,

    /// Prompt or style description the track was generated from, if any
    pub prompt: Option<String>,
}

impl Track {
    /// Create a new track descriptor with minimal metadata
    pub fn new(id: impl Into<String>, audio_url: impl Into<String>, duration: f64) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            audio_url: audio_url.into(),
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            prompt: None,
        }
    }

    /// Set the display title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}
