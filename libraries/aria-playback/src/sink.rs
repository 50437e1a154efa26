//! Platform-agnostic audio sink traits
//!
//! Abstracts the host's audio-output primitive so the engine runs against
//! any platform (web audio element, native stream, test double). Sinks are
//! fire-and-forget: control calls return immediately and the sink reports
//! buffering/terminal conditions later as [`SinkEvent`]s.

use crate::error::{PlaybackError, Result};

/// Events emitted by a sink, drained once per frame by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// The sink decoded enough of the source to know its real duration.
    /// More accurate than the descriptor's stored value.
    MetadataReady {
        /// Decoded duration in seconds
        duration: f64,
    },

    /// Playback reached the end of the loaded source
    Ended,

    /// The sink cannot produce audio for the loaded source
    Error {
        /// Human-readable failure description
        message: String,
    },
}

/// One instance of the host's audio-output primitive
///
/// Bound to at most one source locator at a time. All operations are
/// idempotent thin wrappers: `play` on a playing sink and `pause` on a
/// paused sink are no-ops, and side effects are strictly local to the
/// targeted sink.
pub trait AudioSink: Send {
    /// Assign a new source, force position to 0 and begin buffering.
    ///
    /// Implicitly cancels any in-flight playback intent for this sink;
    /// there is no other cancellation path.
    fn load(&mut self, locator: &str);

    /// Begin or resume playback (no-op when already playing)
    fn play(&mut self);

    /// Pause playback (no-op when already paused)
    fn pause(&mut self);

    /// Jump to a position in seconds (already clamped by the caller)
    fn seek(&mut self, seconds: f64);

    /// Set output gain, 0.0-1.0 (already clamped by the caller)
    fn set_volume(&mut self, gain: f32);

    /// Live playback position in seconds
    fn position(&self) -> f64;

    /// Whether the sink is currently paused (or never started)
    fn is_paused(&self) -> bool;

    /// Drain queued device events in arrival order
    fn take_events(&mut self) -> Vec<SinkEvent>;
}

/// Frequency-analysis tap on a sink's output path
///
/// Yields per-bin normalized magnitude snapshots for the visualizer. The
/// visualizer only reads; a torn read during a transport change is
/// acceptable.
pub trait FrequencyTap: Send {
    /// Number of frequency bins in one snapshot
    fn bin_count(&self) -> usize;

    /// Fill `out` with normalized magnitudes (0.0-1.0), one per bin.
    /// `out.len()` equals `bin_count()`.
    fn read(&mut self, out: &mut [f32]);
}

/// Factory for sinks and analysis taps on one host audio path
pub trait AudioBackend: Send {
    /// Construct a new sink
    fn create_sink(&mut self) -> Box<dyn AudioSink>;

    /// Attach a frequency-analysis tap to the primary output path.
    ///
    /// Platform audio policies only permit this after a user-initiated
    /// interaction; callers must treat failure as non-fatal and fall back
    /// to the idle animation.
    fn create_analyzer(&mut self) -> Result<Box<dyn FrequencyTap>>;
}

/// Backend for headless environments: sinks accept every call and stay
/// silent, and no analysis tap is available.
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn create_sink(&mut self) -> Box<dyn AudioSink> {
        Box::new(NullSink::default())
    }

    fn create_analyzer(&mut self) -> Result<Box<dyn FrequencyTap>> {
        Err(PlaybackError::Sink("no analysis context".to_string()))
    }
}

/// Sink that swallows every operation
#[derive(Debug, Default)]
pub struct NullSink {
    paused: bool,
    position: f64,
    loaded: bool,
}

impl AudioSink for NullSink {
    fn load(&mut self, _locator: &str) {
        self.loaded = true;
        self.position = 0.0;
        self.paused = true;
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn set_volume(&mut self, _gain: f32) {}

    fn position(&self) -> f64 {
        self.position
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn take_events(&mut self) -> Vec<SinkEvent> {
        Vec::new()
    }
}
