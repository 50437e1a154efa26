//! Frequency visualizer sampling
//!
//! Produces rendering-ready bar magnitudes once per frame. When the
//! analysis tap is unavailable (platform policy refused the context) the
//! bars fall back to a pseudo-periodic idle waveform so the UI still looks
//! alive; paused transports settle onto a fixed floor. Nothing in here can
//! fail outward.

use crate::sink::FrequencyTap;

/// Default number of rendered bars
pub const DEFAULT_BAR_COUNT: usize = 32;

/// Per-frame exponential smoothing factor toward the target magnitude
const SMOOTHING: f32 = 0.18;

/// Bars never render below this height
const MIN_HEIGHT: f32 = 0.04;

/// Target height while the transport is paused
const PAUSED_TARGET: f32 = 0.05;

/// Idle waveform: base height, swing amplitude, per-frame phase advance
/// and per-bar phase offset
const IDLE_BASE: f32 = 0.18;
const IDLE_SWING: f32 = 0.22;
const IDLE_SPEED: f32 = 0.045;
const IDLE_BAR_OFFSET: f32 = 0.65;

/// Smoothed per-bar magnitudes for the visualizer
pub struct FrequencySampler {
    /// Smoothed accumulator per bar slot, 0.0-1.0
    bars: Vec<f32>,

    /// Scratch buffer for one tap snapshot
    bins: Vec<f32>,

    /// Idle waveform phase, advanced every frame
    phase: f32,
}

impl FrequencySampler {
    /// Create a sampler with `bar_count` slots (falls back to the default
    /// for zero)
    pub fn new(bar_count: usize) -> Self {
        let bar_count = if bar_count == 0 {
            DEFAULT_BAR_COUNT
        } else {
            bar_count
        };
        Self {
            bars: vec![MIN_HEIGHT; bar_count],
            bins: Vec::new(),
            phase: 0.0,
        }
    }

    /// Current bar heights, 0.0-1.0, one per slot
    pub fn bars(&self) -> &[f32] {
        &self.bars
    }

    /// Advance one frame
    ///
    /// `tap` is the analysis tap if one is attached, `playing` the combined
    /// transport state. Each bar eases toward its target with exponential
    /// smoothing to avoid visual jitter.
    pub fn advance(&mut self, tap: Option<&mut dyn FrequencyTap>, playing: bool) {
        self.phase += IDLE_SPEED;
        if self.phase > std::f32::consts::TAU {
            self.phase -= std::f32::consts::TAU;
        }

        let bar_count = self.bars.len();
        let snapshot = match (tap, playing) {
            (Some(tap), true) => {
                let bin_count = tap.bin_count().max(1);
                self.bins.resize(bin_count, 0.0);
                tap.read(&mut self.bins);
                Some(bin_count)
            }
            _ => None,
        };

        for (i, bar) in self.bars.iter_mut().enumerate() {
            let target = match snapshot {
                Some(bin_count) => {
                    // Linear bar-to-bin mapping across the tap's range
                    let bin = i * bin_count / bar_count;
                    self.bins[bin].clamp(0.0, 1.0)
                }
                None if playing => {
                    let wave = (self.phase + i as f32 * IDLE_BAR_OFFSET).sin() * 0.5 + 0.5;
                    IDLE_BASE + IDLE_SWING * wave
                }
                None => PAUSED_TARGET,
            };

            *bar += (target - *bar) * SMOOTHING;
            *bar = bar.max(MIN_HEIGHT);
        }
    }

    /// Snap every bar back to the floor (used when a player is torn down)
    pub fn reset(&mut self) {
        self.bars.fill(MIN_HEIGHT);
    }
}

impl std::fmt::Debug for FrequencySampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrequencySampler")
            .field("bars", &self.bars.len())
            .finish_non_exhaustive()
    }
}
