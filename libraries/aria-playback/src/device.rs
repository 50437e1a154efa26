//! Shared audio output device
//!
//! The host platform permits meaningful control over only a bounded number
//! of real output paths and analysis contexts, so the primary sink is a
//! process-wide singleton with explicit acquire/release semantics. Stem
//! sinks are created per session and owned privately by the stem player.

use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};
use crate::sink::{AudioBackend, AudioSink, FrequencyTap};

/// Owner of the shared audio output path
pub struct AudioDevice {
    backend: Box<dyn AudioBackend>,

    /// Primary sink, cached across acquire/release cycles so repeated
    /// acquisition reuses the same underlying element
    primary: Option<Box<dyn AudioSink>>,

    /// Whether the primary slot is currently held by a logical player
    primary_held: bool,

    /// Analysis tap on the primary output path, once attached
    analyzer: Option<Box<dyn FrequencyTap>>,

    /// Set when analyzer attachment was refused by platform policy;
    /// further attempts are pointless within this session
    analyzer_blocked: bool,
}

impl AudioDevice {
    /// Create a device over a platform backend
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            primary: None,
            primary_held: false,
            analyzer: None,
            analyzer_blocked: false,
        }
    }

    /// Take exclusive ownership of the primary sink
    ///
    /// Lazily constructs the underlying sink on first acquisition; later
    /// acquisitions hand back the same cached sink. Fails with
    /// [`PlaybackError::DeviceBusy`] while another player holds the slot.
    pub fn acquire_primary(&mut self) -> Result<Box<dyn AudioSink>> {
        if self.primary_held {
            return Err(PlaybackError::DeviceBusy);
        }

        let sink = match self.primary.take() {
            Some(sink) => sink,
            None => {
                debug!("creating primary audio sink");
                self.backend.create_sink()
            }
        };

        self.primary_held = true;
        Ok(sink)
    }

    /// Return the primary sink to the device
    ///
    /// The sink is cached, not destroyed, so the next acquisition reuses
    /// the same underlying element.
    pub fn release_primary(&mut self, sink: Box<dyn AudioSink>) {
        self.primary = Some(sink);
        self.primary_held = false;
    }

    /// Whether the primary slot is currently held
    pub fn is_primary_held(&self) -> bool {
        self.primary_held
    }

    /// Create a private sink for one stem of a multi-track session
    pub fn create_stem_sink(&mut self) -> Box<dyn AudioSink> {
        self.backend.create_sink()
    }

    /// Attach the frequency-analysis tap to the primary output path
    ///
    /// Must be called from a user-initiated interaction; platform policy
    /// blocks analysis-context creation otherwise. Idempotent. Returns
    /// whether a tap is available; on refusal the visualizer degrades to
    /// its idle animation instead of erroring the player.
    pub fn attach_analyzer(&mut self) -> bool {
        if self.analyzer.is_some() {
            return true;
        }
        if self.analyzer_blocked {
            return false;
        }

        match self.backend.create_analyzer() {
            Ok(tap) => {
                debug!(bins = tap.bin_count(), "analysis tap attached");
                self.analyzer = Some(tap);
                true
            }
            Err(err) => {
                warn!(%err, "analysis tap unavailable, falling back to idle animation");
                self.analyzer_blocked = true;
                false
            }
        }
    }

    /// The attached analysis tap, if any
    pub fn analyzer_mut(&mut self) -> Option<&mut (dyn FrequencyTap + '_)> {
        self.analyzer.as_mut().map(|tap| &mut **tap as _)
    }

    /// Whether analyzer attachment was refused by platform policy
    pub fn analyzer_blocked(&self) -> bool {
        self.analyzer_blocked
    }
}

impl std::fmt::Debug for AudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDevice")
            .field("primary_held", &self.primary_held)
            .field("analyzer", &self.analyzer.is_some())
            .field("analyzer_blocked", &self.analyzer_blocked)
            .finish_non_exhaustive()
    }
}
