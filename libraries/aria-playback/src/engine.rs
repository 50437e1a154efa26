//! Player engine - core orchestration
//!
//! Coordinates the shared audio device, the single-track queue player, the
//! multi-track stem player and the frequency sampler behind the intent
//! surface consumed by the UI.
//!
//! All engine logic is single-threaded and cooperative: discrete sink
//! events and the per-frame [`PlayerEngine::tick`] loop drive every
//! transition, and nothing here blocks.

use rand::thread_rng;
use tracing::debug;

use aria_core::{RepeatMode, StemTrack, Track};

use crate::controller::{PlaybackController, TransportSignal};
use crate::device::AudioDevice;
use crate::error::{PlaybackError, Result};
use crate::events::PlayerEvent;
use crate::queue::Queue;
use crate::shuffle::pick_shuffle_index;
use crate::sink::AudioBackend;
use crate::stems::{StemPlayer, StemStatus};
use crate::types::{clamp_gain, PlayerConfig};
use crate::visualizer::FrequencySampler;

/// Seconds into a track beyond which `previous()` restarts it instead of
/// moving the cursor
const PREVIOUS_RESTART_THRESHOLD: f64 = 3.0;

/// Central playback engine
///
/// Owns:
/// - the process-wide [`AudioDevice`] (primary sink + analysis tap)
/// - the queue and its shuffle/repeat policy
/// - the single-track [`PlaybackController`] while the primary slot is held
/// - the multi-track [`StemPlayer`] while a stem set is open
/// - the [`FrequencySampler`] feeding the visualizer
pub struct PlayerEngine {
    device: AudioDevice,

    /// Present while this engine holds the primary sink (single-track mode)
    controller: Option<PlaybackController>,

    queue: Queue,
    shuffle: bool,
    repeat: RepeatMode,

    /// Session volume; survives controller teardown and track changes
    volume: f32,

    /// Present while a stem set is open (multi-track mode)
    stems: Option<StemPlayer>,

    sampler: FrequencySampler,

    /// Event queue for UI synchronization, drained once per frame
    pending_events: Vec<PlayerEvent>,
}

impl PlayerEngine {
    /// Create an engine over a platform backend
    pub fn new(backend: Box<dyn AudioBackend>, config: PlayerConfig) -> Self {
        Self {
            device: AudioDevice::new(backend),
            controller: None,
            queue: Queue::new(),
            shuffle: config.shuffle,
            repeat: config.repeat,
            volume: clamp_gain(config.volume),
            stems: None,
            sampler: FrequencySampler::new(config.visualizer_bars),
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Play a track
    ///
    /// If a track with the same id is already queued the cursor moves to
    /// its existing position (no duplicate insertion); otherwise the track
    /// is appended. Either way playback (re)starts from 0.
    pub fn play(&mut self, track: Track) -> Result<()> {
        // Mode switch: an open stem set is torn down first
        self.clear_stem_set();
        self.device.attach_analyzer();
        self.ensure_controller()?;

        let index = match self.queue.position_of(&track.id) {
            Some(existing) => existing,
            None => {
                let appended = self.queue.push(track);
                self.emit(PlayerEvent::QueueChanged {
                    length: self.queue.len(),
                });
                appended
            }
        };

        self.activate(index)
    }

    /// Pause the single-track transport
    pub fn pause(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            if controller.state().is_playing {
                controller.pause();
                self.emit(PlayerEvent::StateChanged { is_playing: false });
            }
        }
    }

    /// Resume the single-track transport (no-op without a loaded track)
    pub fn resume(&mut self) {
        if let Some(controller) = self.controller.as_mut() {
            if controller.is_loaded() && !controller.state().is_playing {
                controller.resume();
                self.emit(PlayerEvent::StateChanged { is_playing: true });
            }
        }
    }

    /// Seek the active track, clamped to `[0, duration]`
    pub fn seek(&mut self, seconds: f64) {
        if let Some(controller) = self.controller.as_mut() {
            controller.seek(seconds);
        }
    }

    /// Seek the active track by ratio of its duration (0.0-1.0)
    pub fn seek_percent(&mut self, ratio: f64) {
        if let Some(controller) = self.controller.as_mut() {
            let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
            let target = controller.state().duration * ratio;
            controller.seek(target);
        }
    }

    /// Set the session volume, clamped to 0.0-1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_gain(volume);
        if let Some(controller) = self.controller.as_mut() {
            controller.set_volume(self.volume);
        }
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.volume,
        });
    }

    /// Advance to the next track per shuffle/repeat policy
    ///
    /// Repeat-one restarts the active track in place. With repeat off, a
    /// cursor running past the end stops playback and leaves the cursor
    /// where it was (queue exhausted).
    pub fn next(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        // Queue navigation is a single-track intent: an open stem set
        // closes first so only one transport runs
        self.clear_stem_set();
        self.device.attach_analyzer();

        let Some(cursor) = self.queue.cursor() else {
            // Nothing active yet: start from the top
            return self.activate(0);
        };

        if self.repeat == RepeatMode::One {
            self.restart_current();
            return Ok(());
        }

        let candidate = if self.shuffle {
            pick_shuffle_index(self.queue.len(), cursor, &mut thread_rng())
        } else {
            cursor + 1
        };

        if candidate < self.queue.len() {
            self.activate(candidate)
        } else if self.repeat == RepeatMode::All {
            self.activate(0)
        } else {
            // Queue exhausted: stop, cursor unchanged
            debug!("queue exhausted");
            if let Some(controller) = self.controller.as_mut() {
                controller.pause();
            }
            self.emit(PlayerEvent::QueueExhausted);
            self.emit(PlayerEvent::StateChanged { is_playing: false });
            Ok(())
        }
    }

    /// Step back per shuffle/repeat policy
    ///
    /// More than three seconds into a track this restarts it instead of
    /// moving (scrub-back). At index 0 with repeat off the current track
    /// restarts rather than stopping; there is no track before the first.
    pub fn previous(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }

        self.clear_stem_set();
        self.device.attach_analyzer();

        if let Some(controller) = self.controller.as_mut() {
            if controller.is_loaded()
                && controller.state().current_time > PREVIOUS_RESTART_THRESHOLD
            {
                controller.seek(0.0);
                return Ok(());
            }
        }

        let Some(cursor) = self.queue.cursor() else {
            return self.activate(0);
        };

        if self.repeat == RepeatMode::One {
            self.restart_current();
            return Ok(());
        }

        if self.shuffle {
            let candidate = pick_shuffle_index(self.queue.len(), cursor, &mut thread_rng());
            return self.activate(candidate);
        }

        if cursor > 0 {
            self.activate(cursor - 1)
        } else if self.repeat == RepeatMode::All {
            self.activate(self.queue.len() - 1)
        } else {
            self.restart_current();
            Ok(())
        }
    }

    // ===== Queue Management =====

    /// Append a track to the end of the queue (duplicates allowed)
    pub fn add_to_queue(&mut self, track: Track) {
        self.queue.push(track);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    /// Remove the entry at `index`
    ///
    /// The cursor stays on the same logical track where possible; an
    /// emptied queue stops the transport.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<Track> {
        let removed = self.queue.remove(index)?;
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });

        if self.queue.is_empty() {
            if let Some(controller) = self.controller.as_mut() {
                let was_playing = controller.state().is_playing;
                controller.stop();
                if was_playing {
                    self.emit(PlayerEvent::StateChanged { is_playing: false });
                }
            }
        }

        Ok(removed)
    }

    /// Reorder the queue without changing which track is current
    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_track(from, to)?;
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
        Ok(())
    }

    /// Drop every queued track and stop the transport
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit(PlayerEvent::QueueChanged { length: 0 });
        if let Some(controller) = self.controller.as_mut() {
            let was_playing = controller.state().is_playing;
            controller.stop();
            if was_playing {
                self.emit(PlayerEvent::StateChanged { is_playing: false });
            }
        }
    }

    /// Atomically replace the queue and auto-play its first track
    pub fn set_queue(&mut self, tracks: Vec<Track>) -> Result<()> {
        self.clear_stem_set();
        self.queue.replace(tracks);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });

        if self.queue.is_empty() {
            if let Some(controller) = self.controller.as_mut() {
                controller.stop();
            }
            return Ok(());
        }

        self.device.attach_analyzer();
        self.ensure_controller()?;
        self.activate(0)
    }

    // ===== Shuffle & Repeat =====

    /// Flip the shuffle flag; returns the new value. Does not affect the
    /// currently loaded track.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    /// Cycle the repeat mode Off -> All -> One -> Off; returns the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    // ===== Multi-Track (stems) =====

    /// Open a stem set in the multi-track player
    ///
    /// Single-track playback stops and the primary slot is released first;
    /// any previously open stem set is torn down as a unit.
    pub fn load_stem_set(&mut self, stems: Vec<StemTrack>) -> Result<()> {
        self.release_controller();
        self.clear_stem_set();

        let player = StemPlayer::new(&mut self.device, stems)?;
        self.emit(PlayerEvent::StemSetLoaded {
            count: player.len(),
        });
        self.stems = Some(player);
        Ok(())
    }

    /// Tear the open stem set down (no-op when none is open)
    pub fn clear_stem_set(&mut self) {
        if let Some(mut player) = self.stems.take() {
            player.shutdown();
            self.sampler.reset();
            self.emit(PlayerEvent::StemSetCleared);
        }
    }

    /// Toggle the shared stem transport; returns the new playing state
    pub fn play_all_toggle(&mut self) -> bool {
        self.device.attach_analyzer();
        match self.stems.as_mut() {
            Some(player) => {
                let playing = player.toggle();
                self.emit(PlayerEvent::StateChanged {
                    is_playing: playing,
                });
                playing
            }
            None => false,
        }
    }

    /// Seek every stem sink to `ratio` (0.0-1.0) of the master duration
    pub fn seek_all(&mut self, ratio: f64) {
        if let Some(player) = self.stems.as_mut() {
            player.seek_ratio(ratio);
        }
    }

    /// Set one stem type's own volume (0.0-1.0)
    pub fn set_stem_volume(&mut self, stem_type: aria_core::StemType, volume: f32) {
        if let Some(player) = self.stems.as_mut() {
            player.set_volume(stem_type, volume);
        }
    }

    /// Flip one stem type's mute flag
    pub fn toggle_mute(&mut self, stem_type: aria_core::StemType) {
        if let Some(player) = self.stems.as_mut() {
            player.toggle_mute(stem_type);
        }
    }

    /// Solo a stem type, or un-solo it when already soloed
    pub fn toggle_solo(&mut self, stem_type: aria_core::StemType) {
        if let Some(player) = self.stems.as_mut() {
            player.toggle_solo(stem_type);
        }
    }

    // ===== Frame Loop =====

    /// Per-frame update, called once per rendered frame
    ///
    /// Samples transport positions, drains sink events (a sink's ended
    /// event is the sole implicit trigger for `next()`), and advances the
    /// visualizer.
    pub fn tick(&mut self) {
        let signals = match self.controller.as_mut() {
            Some(controller) => {
                controller.tick();
                controller.poll()
            }
            None => Vec::new(),
        };

        for signal in signals {
            match signal {
                TransportSignal::Ended => {
                    if let Some(track) = self.queue.current() {
                        let track_id = track.id.clone();
                        self.emit(PlayerEvent::TrackFinished { track_id });
                    }
                    // Queue-empty here just means nothing left to play
                    let _ = self.next();
                }
                TransportSignal::Failed(message) => {
                    self.emit(PlayerEvent::Error { message });
                    self.emit(PlayerEvent::StateChanged { is_playing: false });
                }
            }
        }

        if let Some(player) = self.stems.as_mut() {
            player.tick();
        }

        let playing = self.is_playing();
        self.sampler.advance(self.device.analyzer_mut(), playing);
    }

    // ===== State Queries =====

    /// The active queue track, if any
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    /// Live position of the single-track transport in seconds
    pub fn current_time(&self) -> f64 {
        self.controller
            .as_ref()
            .map_or(0.0, |c| c.state().current_time)
    }

    /// Duration of the active track in seconds
    pub fn duration(&self) -> f64 {
        self.controller.as_ref().map_or(0.0, |c| c.state().duration)
    }

    /// Whether either player's transport is running
    pub fn is_playing(&self) -> bool {
        let single = self
            .controller
            .as_ref()
            .is_some_and(|c| c.state().is_playing);
        let multi = self.stems.as_ref().is_some_and(StemPlayer::is_playing);
        single || multi
    }

    /// Session volume, 0.0-1.0
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Queue contents in order
    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    /// Index of the active track, if any
    pub fn queue_cursor(&self) -> Option<usize> {
        self.queue.cursor()
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Whether `next()` would move somewhere (or restart under repeat)
    pub fn has_next(&self) -> bool {
        match self.queue.cursor() {
            None => !self.queue.is_empty(),
            Some(cursor) => {
                self.repeat != RepeatMode::Off
                    || (self.shuffle && self.queue.len() > 1)
                    || cursor + 1 < self.queue.len()
            }
        }
    }

    /// Whether `previous()` would do anything (restart counts)
    pub fn has_previous(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Current visualizer bar heights, 0.0-1.0
    pub fn visualizer_bars(&self) -> &[f32] {
        self.sampler.bars()
    }

    /// Master transport of the open stem set: (position, duration, ready)
    pub fn stem_transport(&self) -> Option<(f64, f64, bool)> {
        self.stems
            .as_ref()
            .map(|p| (p.current_time(), p.duration(), p.is_ready()))
    }

    /// Mixer state of the open stem set
    pub fn stem_mix(&self) -> Vec<StemStatus> {
        self.stems.as_ref().map(StemPlayer::mix).unwrap_or_default()
    }

    /// The soloed stem type, if any
    pub fn soloed_stem(&self) -> Option<aria_core::StemType> {
        self.stems.as_ref().and_then(StemPlayer::soloed)
    }

    /// Whether a stem set is currently open
    pub fn has_stem_set(&self) -> bool {
        self.stems.is_some()
    }

    /// Drain queued UI events
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    /// Acquire the primary sink on first use
    fn ensure_controller(&mut self) -> Result<()> {
        if self.controller.is_none() {
            let sink = self.device.acquire_primary()?;
            self.controller = Some(PlaybackController::new(sink, self.volume));
        }
        Ok(())
    }

    /// Stop the single-track player and hand the primary sink back
    fn release_controller(&mut self) {
        if let Some(controller) = self.controller.take() {
            let was_playing = controller.state().is_playing;
            self.device.release_primary(controller.into_sink());
            self.sampler.reset();
            if was_playing {
                self.emit(PlayerEvent::StateChanged { is_playing: false });
            }
        }
    }

    /// Move the cursor to `index` and play that track from 0
    fn activate(&mut self, index: usize) -> Result<()> {
        self.ensure_controller()?;

        let previous_track_id = self.queue.current().map(|t| t.id.clone());
        self.queue.select(index)?;

        let Some(track) = self.queue.current().cloned() else {
            return Err(PlaybackError::NoTrackLoaded);
        };

        if let Some(controller) = self.controller.as_mut() {
            controller.play(&track);
        }

        debug!(track_id = %track.id, index, "track activated");
        self.emit(PlayerEvent::TrackChanged {
            track_id: track.id,
            previous_track_id,
        });
        self.emit(PlayerEvent::StateChanged { is_playing: true });
        Ok(())
    }

    /// Restart the active track from 0 without moving the cursor
    ///
    /// A mode switch can leave the cursor set with nothing loaded; the
    /// cursor entry is activated from scratch in that case.
    fn restart_current(&mut self) {
        let loaded = self
            .controller
            .as_ref()
            .is_some_and(PlaybackController::is_loaded);

        if loaded {
            if let Some(controller) = self.controller.as_mut() {
                controller.restart();
            }
            self.emit(PlayerEvent::StateChanged { is_playing: true });
        } else if let Some(cursor) = self.queue.cursor() {
            let _ = self.activate(cursor);
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }
}

impl std::fmt::Debug for PlayerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerEngine")
            .field("queue_len", &self.queue.len())
            .field("cursor", &self.queue.cursor())
            .field("shuffle", &self.shuffle)
            .field("repeat", &self.repeat)
            .field("volume", &self.volume)
            .field("stems", &self.stems.is_some())
            .finish_non_exhaustive()
    }
}
