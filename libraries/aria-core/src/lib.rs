//! Aria Core
//!
//! Platform-agnostic domain types shared between the Aria playback engine
//! and its collaborators (generation results, library records, stem
//! separation results).
//!
//! The core crate defines:
//! - **Descriptors**: [`Track`], [`StemTrack`], [`StemType`]
//! - **Playback policy**: [`RepeatMode`]
//! - **Error Handling**: unified [`AriaError`] and [`Result`] types
//!
//! # Example
//!
//! ```rust
//! use aria_core::{Track, StemTrack, StemType};
//!
//! // A generation result handed to the playback engine
//! let track = Track::new("gen-42", "/audio/gen-42.mp3", 183.5);
//!
//! // One stem of a separation job
//! let stem = StemTrack::new("gen-42", StemType::Vocals, "/stems/gen-42/vocals.wav");
//! assert_eq!(stem.stem_type.as_str(), "vocals");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AriaError, Result};
pub use types::{RepeatMode, StemTrack, StemType, Track};
