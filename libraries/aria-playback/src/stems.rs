//! Multi-track stem player
//!
//! Presents one separation job's stems as a single cohesive transport: all
//! sinks start, pause and seek together, and the master position is read
//! from the first-created reference sink. Per-stem volume/mute/solo are
//! output-gain concerns only and never touch a sink's transport, so timing
//! is unaffected by mixer toggling.
//!
//! Known limitation: `play_all`/`pause_all` issue per-sink calls
//! back-to-back with no rendezvous and no periodic resynchronization, so
//! stems can drift slightly out of phase on slow devices.

use serde::Serialize;
use tracing::{debug, warn};

use aria_core::{StemTrack, StemType};

use crate::device::AudioDevice;
use crate::error::{PlaybackError, Result};
use crate::sink::{AudioSink, SinkEvent};
use crate::types::clamp_gain;

/// Audible gain for one stem under the set-wide solo/mute rules
///
/// Muting wins outright; an active solo silences every other stem type;
/// otherwise the stem's own volume applies.
pub fn effective_gain(volume: f32, muted: bool, stem_type: StemType, soloed: Option<StemType>) -> f32 {
    if muted {
        return 0.0;
    }
    if let Some(solo) = soloed {
        if solo != stem_type {
            return 0.0;
        }
    }
    volume
}

/// Mixer state of one stem, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StemStatus {
    pub stem_type: StemType,
    pub volume: f32,
    pub muted: bool,
    /// Gain actually applied to the sink after mute/solo rules
    pub effective_gain: f32,
}

struct StemChannel {
    track: StemTrack,
    sink: Box<dyn AudioSink>,
    volume: f32,
    muted: bool,
    /// Decoded duration once the sink reports it
    reported_duration: Option<f64>,
}

/// Synchronized multi-sink player for one stem set
pub struct StemPlayer {
    /// Channel 0 is the reference sink for the master transport
    channels: Vec<StemChannel>,
    soloed: Option<StemType>,
    playing: bool,
    current_time: f64,
    /// Max of all reported durations; 0 until at least one sink reports
    duration: f64,
}

impl StemPlayer {
    /// Create one sink per stem and begin buffering all of them
    pub fn new(device: &mut AudioDevice, stems: Vec<StemTrack>) -> Result<Self> {
        if stems.is_empty() {
            return Err(PlaybackError::EmptyStemSet);
        }

        let channels = stems
            .into_iter()
            .map(|track| {
                let mut sink = device.create_stem_sink();
                sink.load(&track.audio_url);
                StemChannel {
                    track,
                    sink,
                    volume: 1.0,
                    muted: false,
                    reported_duration: None,
                }
            })
            .collect::<Vec<_>>();

        debug!(stems = channels.len(), "stem set loaded");

        let mut player = Self {
            channels,
            soloed: None,
            playing: false,
            current_time: 0.0,
            duration: 0.0,
        };
        player.apply_gains();
        Ok(player)
    }

    /// Issue `play` to every sink, back-to-back, no barrier
    pub fn play_all(&mut self) {
        for channel in &mut self.channels {
            channel.sink.play();
        }
        self.playing = true;
    }

    /// Issue `pause` to every sink
    pub fn pause_all(&mut self) {
        for channel in &mut self.channels {
            channel.sink.pause();
        }
        self.playing = false;
    }

    /// Toggle the shared transport; returns the new playing state
    pub fn toggle(&mut self) -> bool {
        if self.playing {
            self.pause_all();
        } else {
            self.play_all();
        }
        self.playing
    }

    /// Seek every sink to `ratio` (0.0-1.0) of the master duration
    pub fn seek_ratio(&mut self, ratio: f64) {
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        let target = ratio * self.duration;
        for channel in &mut self.channels {
            channel.sink.seek(target);
        }
        self.current_time = target;
    }

    /// Set one stem type's own volume (0.0-1.0)
    pub fn set_volume(&mut self, stem_type: StemType, volume: f32) {
        let volume = clamp_gain(volume);
        for channel in &mut self.channels {
            if channel.track.stem_type == stem_type {
                channel.volume = volume;
            }
        }
        self.apply_gains();
    }

    /// Flip one stem type's mute flag
    pub fn toggle_mute(&mut self, stem_type: StemType) {
        for channel in &mut self.channels {
            if channel.track.stem_type == stem_type {
                channel.muted = !channel.muted;
            }
        }
        self.apply_gains();
    }

    /// Solo a stem type, or un-solo it when already soloed
    pub fn toggle_solo(&mut self, stem_type: StemType) {
        self.soloed = if self.soloed == Some(stem_type) {
            None
        } else {
            Some(stem_type)
        };
        self.apply_gains();
    }

    /// Push the effective gain of every channel down to its sink
    fn apply_gains(&mut self) {
        for channel in &mut self.channels {
            let gain = effective_gain(
                channel.volume,
                channel.muted,
                channel.track.stem_type,
                self.soloed,
            );
            channel.sink.set_volume(gain);
        }
    }

    /// Per-frame update: drain sink events and sample the reference sink
    pub fn tick(&mut self) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            for event in channel.sink.take_events() {
                match event {
                    SinkEvent::MetadataReady { duration } => {
                        if duration.is_finite() && duration > 0.0 {
                            channel.reported_duration = Some(duration);
                        }
                    }
                    SinkEvent::Ended => {
                        // Only the reference sink ends the shared transport
                        if index == 0 {
                            self.playing = false;
                        }
                    }
                    SinkEvent::Error { message } => {
                        warn!(stem = %channel.track.stem_type, %message, "stem sink failed");
                    }
                }
            }
        }

        // Master duration is the max of everything reported so far
        self.duration = self
            .channels
            .iter()
            .filter_map(|c| c.reported_duration)
            .fold(0.0, f64::max);

        if self.playing {
            if let Some(reference) = self.channels.first() {
                if !reference.sink.is_paused() {
                    self.current_time = reference.sink.position();
                }
            }
        }
    }

    /// Pause and release every sink's source together
    ///
    /// Called when the stem set is replaced or its view closes, so no sink
    /// keeps playing in the background.
    pub fn shutdown(&mut self) {
        for channel in &mut self.channels {
            channel.sink.pause();
        }
        self.playing = false;
    }

    /// Whether at least one sink has reported its decoded duration
    pub fn is_ready(&self) -> bool {
        self.duration > 0.0
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Master transport position in seconds (reference sink)
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Master duration in seconds (max of reported durations)
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The soloed stem type, if any
    pub fn soloed(&self) -> Option<StemType> {
        self.soloed
    }

    /// Mixer state per channel, in creation order
    pub fn mix(&self) -> Vec<StemStatus> {
        self.channels
            .iter()
            .map(|channel| StemStatus {
                stem_type: channel.track.stem_type,
                volume: channel.volume,
                muted: channel.muted,
                effective_gain: effective_gain(
                    channel.volume,
                    channel.muted,
                    channel.track.stem_type,
                    self.soloed,
                ),
            })
            .collect()
    }

    /// Number of stems in the set
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Drop for StemPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for StemPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StemPlayer")
            .field("stems", &self.channels.len())
            .field("soloed", &self.soloed)
            .field("playing", &self.playing)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}
