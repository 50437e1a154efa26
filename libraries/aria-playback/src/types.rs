//! Core types for the playback engine

use serde::{Deserialize, Serialize};

pub use aria_core::RepeatMode;

/// Transport state of the single-track player
///
/// `current_time` is reset to 0 every time a new track becomes active.
/// `is_playing` flips only on explicit control calls or terminal sink
/// events (ended, error).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Live position in seconds, sampled each frame while playing
    pub current_time: f64,

    /// Track duration in seconds. Provisional (descriptor value) until the
    /// sink reports a decoded duration.
    pub duration: f64,

    /// Whether the transport is playing
    pub is_playing: bool,

    /// Output gain, 0.0-1.0, clamped on every write
    pub volume: f32,
}

impl PlaybackState {
    /// State for a freshly loaded track
    pub fn for_track(duration: f64, volume: f32) -> Self {
        Self {
            current_time: 0.0,
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            is_playing: false,
            volume,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            volume: 1.0,
        }
    }
}

/// Configuration for the player engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Number of visualizer bars (default: 32)
    pub visualizer_bars: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::Off,
            visualizer_bars: crate::visualizer::DEFAULT_BAR_COUNT,
        }
    }
}

/// Clamp a volume/gain value into the 0.0-1.0 range (NaN becomes 0)
pub(crate) fn clamp_gain(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Clamp a seek target into `[0, duration]` (NaN/negative become 0)
pub(crate) fn clamp_seek(t: f64, duration: f64) -> f64 {
    if !t.is_finite() || t < 0.0 {
        0.0
    } else {
        t.min(duration.max(0.0))
    }
}
