//! Aria - Playback Engine
//!
//! Platform-agnostic playback engine for the Aria music client.
//!
//! This crate provides:
//! - Single-track queue playback (play, pause, seek, volume)
//! - Shuffle and repeat modes (Off, All, One)
//! - Queue management (add, remove, reorder, atomic replace)
//! - Multi-track stem playback (per-stem volume, mute, solo)
//! - Frequency visualization with an idle-animation fallback
//! - An event queue for UI synchronization
//!
//! # Architecture
//!
//! `aria-playback` is completely platform-agnostic:
//! - No dependency on any concrete audio API
//! - No dependency on any UI toolkit
//! - Drives everything from a per-frame [`PlayerEngine::tick`] call
//!
//! Platform-specific audio output is provided via the [`AudioBackend`],
//! [`AudioSink`] and [`FrequencyTap`] traits. Sinks are fire-and-forget:
//! the engine issues commands without waiting and learns about outcomes
//! through drained [`SinkEvent`]s on the next frame.
//!
//! # Example: Queue Playback
//!
//! ```rust
//! use aria_core::Track;
//! use aria_playback::{NullBackend, PlayerConfig, PlayerEngine};
//!
//! let mut engine = PlayerEngine::new(Box::new(NullBackend), PlayerConfig::default());
//!
//! engine.set_volume(0.8);
//!
//! let track = Track::new("track-1", "/music/song.mp3", 180.0)
//!     .with_title("My Song");
//! engine.play(track)?;
//!
//! engine.pause();
//! engine.resume();
//! engine.seek(30.0);
//!
//! // Once per rendered frame
//! engine.tick();
//! for _event in engine.take_events() {
//!     // update the UI
//! }
//! # Ok::<(), aria_playback::PlaybackError>(())
//! ```
//!
//! # Example: Shuffle and Repeat
//!
//! ```rust
//! use aria_core::RepeatMode;
//! use aria_playback::{NullBackend, PlayerConfig, PlayerEngine};
//!
//! let mut engine = PlayerEngine::new(Box::new(NullBackend), PlayerConfig::default());
//!
//! engine.toggle_shuffle();
//! assert!(engine.shuffle());
//!
//! assert_eq!(engine.cycle_repeat(), RepeatMode::All);
//! ```
//!
//! # Example: Stem Playback
//!
//! ```rust
//! use aria_core::{StemTrack, StemType};
//! use aria_playback::{NullBackend, PlayerConfig, PlayerEngine};
//!
//! let mut engine = PlayerEngine::new(Box::new(NullBackend), PlayerConfig::default());
//!
//! engine.load_stem_set(vec![
//!     StemTrack::new("track-1", StemType::Vocals, "/stems/vocals.wav"),
//!     StemTrack::new("track-1", StemType::Drums, "/stems/drums.wav"),
//! ])?;
//!
//! engine.play_all_toggle();
//! engine.toggle_solo(StemType::Vocals);
//! engine.set_stem_volume(StemType::Drums, 0.5);
//! # Ok::<(), aria_playback::PlaybackError>(())
//! ```

mod controller;
mod device;
mod error;
mod events;
mod queue;
mod shuffle;
pub mod sink;
mod stems;
pub mod types;
mod visualizer;

mod engine;

// Public exports
pub use controller::{PlaybackController, TransportSignal};
pub use device::AudioDevice;
pub use engine::PlayerEngine;
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use queue::Queue;
pub use shuffle::pick_shuffle_index;
pub use sink::{AudioBackend, AudioSink, FrequencyTap, NullBackend, NullSink, SinkEvent};
pub use stems::{effective_gain, StemPlayer, StemStatus};
pub use types::{PlaybackState, PlayerConfig, RepeatMode};
pub use visualizer::FrequencySampler;
