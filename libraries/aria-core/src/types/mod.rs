//! Domain types for the Aria client

mod playback_mode;
mod stem;
mod track;

pub use playback_mode::RepeatMode;
pub use stem::{StemTrack, StemType};
pub use track::Track;
