//! Player events
//!
//! Event-based communication for UI synchronization. The engine queues
//! events as transitions happen; the embedding layer drains them once per
//! frame with [`crate::PlayerEngine::take_events`] and forwards them to
//! rendering.

use serde::{Deserialize, Serialize};

/// Events emitted by the player engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Transport started or stopped
    StateChanged {
        /// The new playing flag
        is_playing: bool,
    },

    /// A different track became active
    TrackChanged {
        /// Id of the new active track
        track_id: String,
        /// Id of the previously active track, if any
        previous_track_id: Option<String>,
    },

    /// The active track played to its natural end
    TrackFinished {
        /// Id of the finished track
        track_id: String,
    },

    /// Queue contents changed (added/removed/reordered/replaced)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// The queue ran out with repeat off; playback stopped
    QueueExhausted,

    /// Session volume changed
    VolumeChanged {
        /// New gain, 0.0-1.0
        volume: f32,
    },

    /// A stem set finished loading into the multi-track player
    StemSetLoaded {
        /// Number of stems in the set
        count: usize,
    },

    /// The multi-track player was torn down
    StemSetCleared,

    /// A sink failed; playback stopped without retry
    Error {
        /// Failure description
        message: String,
    },
}
