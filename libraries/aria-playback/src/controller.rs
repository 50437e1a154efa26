//! Single-sink transport
//!
//! Translates play/pause/seek/volume intents into sink calls and sink
//! events into [`PlaybackState`] updates. Performs no queue logic: terminal
//! conditions are surfaced as [`TransportSignal`]s for the engine.

use tracing::{debug, warn};

use aria_core::Track;

use crate::sink::{AudioSink, SinkEvent};
use crate::types::{clamp_gain, clamp_seek, PlaybackState};

/// Terminal conditions the engine must react to
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// The loaded track played to its end
    Ended,

    /// The sink cannot produce audio for the loaded source
    Failed(String),
}

/// Transport over one acquired sink
pub struct PlaybackController {
    sink: Box<dyn AudioSink>,
    state: PlaybackState,
    loaded: bool,
}

impl PlaybackController {
    /// Wrap an acquired sink, applying the session volume
    pub fn new(mut sink: Box<dyn AudioSink>, volume: f32) -> Self {
        let volume = clamp_gain(volume);
        sink.set_volume(volume);
        Self {
            sink,
            state: PlaybackState {
                volume,
                ..PlaybackState::default()
            },
            loaded: false,
        }
    }

    /// Load a track and start playing it from 0
    ///
    /// The descriptor duration is provisional; the sink's metadata event
    /// overwrites it once the real decoded duration is known. Loading
    /// implicitly cancels any in-flight intent on this sink.
    pub fn play(&mut self, track: &Track) {
        debug!(track_id = %track.id, "loading track");
        self.sink.load(&track.audio_url);
        let volume = self.state.volume;
        self.state = PlaybackState::for_track(track.duration, volume);
        self.sink.set_volume(volume);
        self.sink.play();
        self.state.is_playing = true;
        self.loaded = true;
    }

    /// Pause the transport (no-op when not playing)
    pub fn pause(&mut self) {
        if self.state.is_playing {
            self.sink.pause();
            self.state.is_playing = false;
        }
    }

    /// Resume the transport (no-op without a loaded track)
    pub fn resume(&mut self) {
        if self.loaded && !self.state.is_playing {
            self.sink.play();
            self.state.is_playing = true;
        }
    }

    /// Restart the loaded track from 0 and play
    pub fn restart(&mut self) {
        if self.loaded {
            self.sink.seek(0.0);
            self.state.current_time = 0.0;
            self.sink.play();
            self.state.is_playing = true;
        }
    }

    /// Seek, clamped to `[0, duration]`; NaN and negatives land on 0
    pub fn seek(&mut self, seconds: f64) {
        if !self.loaded {
            return;
        }
        let target = clamp_seek(seconds, self.state.duration);
        self.sink.seek(target);
        self.state.current_time = target;
    }

    /// Set output gain, clamped to 0.0-1.0
    pub fn set_volume(&mut self, gain: f32) {
        let gain = clamp_gain(gain);
        self.state.volume = gain;
        self.sink.set_volume(gain);
    }

    /// Per-frame position sampling
    ///
    /// Copies the sink's live position only while the transport is playing
    /// and the sink is not paused, avoiding stale reads during pause/seek
    /// races.
    pub fn tick(&mut self) {
        if self.state.is_playing && !self.sink.is_paused() {
            self.state.current_time = self.sink.position();
        }
    }

    /// Drain sink events, apply local state updates and return terminal
    /// signals for the engine
    pub fn poll(&mut self) -> Vec<TransportSignal> {
        let mut signals = Vec::new();
        for event in self.sink.take_events() {
            match event {
                SinkEvent::MetadataReady { duration } => {
                    if duration.is_finite() && duration > 0.0 {
                        self.state.duration = duration;
                    }
                }
                SinkEvent::Ended => {
                    self.state.is_playing = false;
                    signals.push(TransportSignal::Ended);
                }
                SinkEvent::Error { message } => {
                    warn!(%message, "sink reported playback failure");
                    self.state.is_playing = false;
                    signals.push(TransportSignal::Failed(message));
                }
            }
        }
        signals
    }

    /// Pause and drop the loaded source reference
    pub fn stop(&mut self) {
        self.sink.pause();
        self.state.is_playing = false;
        self.state.current_time = 0.0;
        self.loaded = false;
    }

    /// Current transport state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Whether a track is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Give the sink back for release to the device
    pub fn into_sink(mut self) -> Box<dyn AudioSink> {
        self.sink.pause();
        self.sink
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}
