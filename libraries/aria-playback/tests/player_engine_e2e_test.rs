//! End-to-end tests for PlayerEngine
//!
//! Drives the full engine against a scripted mock backend:
//! - Implicit track advance on sink ended events
//! - Repeat and shuffle interaction with the frame loop
//! - Metadata and error event handling
//! - Primary sink reuse and stem sink fan-out
//! - Stem transport, mixer gains and master duration
//! - Visualizer feeding and fallback behavior

use std::sync::{Arc, Mutex};

use aria_core::{RepeatMode, StemTrack, StemType, Track};
use aria_playback::{
    AudioBackend, AudioSink, FrequencyTap, PlaybackError, PlayerConfig, PlayerEngine, PlayerEvent,
    Result, SinkEvent,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Observable state of one mock sink, shared with the test body
struct SinkState {
    loaded: Option<String>,
    load_count: usize,
    paused: bool,
    position: f64,
    volume: f32,
    pending: Vec<SinkEvent>,
}

impl SinkState {
    fn new() -> Self {
        Self {
            loaded: None,
            load_count: 0,
            paused: true,
            position: 0.0,
            volume: 1.0,
            pending: Vec::new(),
        }
    }
}

type SharedSink = Arc<Mutex<SinkState>>;

/// Sink whose state the test can inspect and script from outside
struct MockSink(SharedSink);

impl AudioSink for MockSink {
    fn load(&mut self, locator: &str) {
        let mut state = self.0.lock().unwrap();
        state.loaded = Some(locator.to_string());
        state.load_count += 1;
        state.position = 0.0;
        state.paused = true;
    }

    fn play(&mut self) {
        self.0.lock().unwrap().paused = false;
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().paused = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.0.lock().unwrap().position = seconds;
    }

    fn set_volume(&mut self, gain: f32) {
        self.0.lock().unwrap().volume = gain;
    }

    fn position(&self) -> f64 {
        self.0.lock().unwrap().position
    }

    fn is_paused(&self) -> bool {
        self.0.lock().unwrap().paused
    }

    fn take_events(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.0.lock().unwrap().pending)
    }
}

/// Tap returning a fixed magnitude in every bin
struct MockTap {
    magnitude: f32,
}

impl FrequencyTap for MockTap {
    fn bin_count(&self) -> usize {
        64
    }

    fn read(&mut self, out: &mut [f32]) {
        out.fill(self.magnitude);
    }
}

/// Backend that records every sink it creates
struct MockBackend {
    sinks: Arc<Mutex<Vec<SharedSink>>>,
    analyzer_magnitude: Option<f32>,
}

impl AudioBackend for MockBackend {
    fn create_sink(&mut self) -> Box<dyn AudioSink> {
        let state = Arc::new(Mutex::new(SinkState::new()));
        self.sinks.lock().unwrap().push(Arc::clone(&state));
        Box::new(MockSink(state))
    }

    fn create_analyzer(&mut self) -> Result<Box<dyn FrequencyTap>> {
        match self.analyzer_magnitude {
            Some(magnitude) => Ok(Box::new(MockTap { magnitude })),
            None => Err(PlaybackError::Sink("analysis context refused".to_string())),
        }
    }
}

struct Harness {
    engine: PlayerEngine,
    sinks: Arc<Mutex<Vec<SharedSink>>>,
}

impl Harness {
    fn new() -> Self {
        Self::with_analyzer(None)
    }

    fn with_analyzer(magnitude: Option<f32>) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("aria_playback=debug")
            .try_init();

        let sinks = Arc::new(Mutex::new(Vec::new()));
        let backend = MockBackend {
            sinks: Arc::clone(&sinks),
            analyzer_magnitude: magnitude,
        };
        Self {
            engine: PlayerEngine::new(Box::new(backend), PlayerConfig::default()),
            sinks,
        }
    }

    fn sink_count(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    fn sink(&self, index: usize) -> SharedSink {
        Arc::clone(&self.sinks.lock().unwrap()[index])
    }

    fn push_event(&self, index: usize, event: SinkEvent) {
        self.sink(index).lock().unwrap().pending.push(event);
    }

    fn set_position(&self, index: usize, seconds: f64) {
        self.sink(index).lock().unwrap().position = seconds;
    }
}

fn track(id: &str) -> Track {
    Track::new(id, format!("/audio/{id}.mp3"), 180.0)
}

fn stem_set() -> Vec<StemTrack> {
    vec![
        StemTrack::new("t", StemType::Vocals, "/stems/vocals.wav"),
        StemTrack::new("t", StemType::Drums, "/stems/drums.wav"),
        StemTrack::new("t", StemType::Bass, "/stems/bass.wav"),
    ]
}

// ============================================================================
// Implicit advance on ended events
// ============================================================================

#[test]
fn ended_event_advances_to_next_track() {
    let mut h = Harness::new();
    h.engine.set_queue(vec![track("a"), track("b")]).unwrap();
    h.engine.take_events();

    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();

    assert_eq!(h.engine.current_track().unwrap().id, "b");
    assert_eq!(h.engine.queue_cursor(), Some(1));
    assert!(h.engine.is_playing());
    assert_eq!(h.sink(0).lock().unwrap().load_count, 2);

    let events = h.engine.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, PlayerEvent::TrackFinished { track_id } if track_id == "a")));
    assert!(events
        .iter()
        .any(|e| matches!(e, PlayerEvent::TrackChanged { track_id, .. } if track_id == "b")));
}

#[test]
fn ended_on_last_track_exhausts_queue_with_repeat_off() {
    let mut h = Harness::new();
    h.engine.set_queue(vec![track("a"), track("b")]).unwrap();
    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();
    h.engine.take_events();

    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();

    assert!(!h.engine.is_playing());
    // Cursor stays where it was; nothing wraps
    assert_eq!(h.engine.queue_cursor(), Some(1));
    assert_eq!(h.engine.current_track().unwrap().id, "b");
    assert!(h
        .engine
        .take_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::QueueExhausted)));
}

#[test]
fn ended_on_last_track_wraps_with_repeat_all() {
    let mut h = Harness::new();
    h.engine.set_queue(vec![track("a"), track("b")]).unwrap();
    h.engine.cycle_repeat(); // All

    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();
    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();

    assert_eq!(h.engine.current_track().unwrap().id, "a");
    assert_eq!(h.engine.queue_cursor(), Some(0));
    assert!(h.engine.is_playing());
    assert_eq!(h.sink(0).lock().unwrap().load_count, 3);
}

#[test]
fn ended_with_repeat_one_restarts_without_reloading() {
    let mut h = Harness::new();
    h.engine.set_queue(vec![track("a"), track("b")]).unwrap();
    h.engine.cycle_repeat(); // All
    h.engine.cycle_repeat(); // One

    h.set_position(0, 180.0);
    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();

    assert_eq!(h.engine.queue_cursor(), Some(0));
    assert!(h.engine.is_playing());
    assert_eq!(h.engine.current_time(), 0.0);
    // Restart seeks instead of reloading the source
    assert_eq!(h.sink(0).lock().unwrap().load_count, 1);
    assert_eq!(h.sink(0).lock().unwrap().position, 0.0);
}

#[test]
fn shuffle_advance_on_ended_picks_a_different_entry() {
    let mut h = Harness::new();
    h.engine
        .set_queue(vec![track("a"), track("b"), track("c"), track("d")])
        .unwrap();
    h.engine.toggle_shuffle();

    for _ in 0..30 {
        let before = h.engine.queue_cursor().unwrap();
        h.push_event(0, SinkEvent::Ended);
        h.engine.tick();
        assert_ne!(h.engine.queue_cursor().unwrap(), before);
        assert!(h.engine.is_playing());
    }
}

// ============================================================================
// Sink event handling
// ============================================================================

#[test]
fn metadata_overwrites_provisional_duration() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();
    assert_eq!(h.engine.duration(), 180.0);

    h.push_event(0, SinkEvent::MetadataReady { duration: 185.5 });
    h.engine.tick();
    assert_eq!(h.engine.duration(), 185.5);
}

#[test]
fn invalid_metadata_durations_are_ignored() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();

    h.push_event(0, SinkEvent::MetadataReady { duration: 0.0 });
    h.push_event(0, SinkEvent::MetadataReady { duration: f64::NAN });
    h.push_event(
        0,
        SinkEvent::MetadataReady {
            duration: f64::INFINITY,
        },
    );
    h.engine.tick();
    assert_eq!(h.engine.duration(), 180.0);
}

#[test]
fn sink_error_stops_playback_and_surfaces_the_message() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();
    h.engine.take_events();

    h.push_event(
        0,
        SinkEvent::Error {
            message: "decode failed".to_string(),
        },
    );
    h.engine.tick();

    assert!(!h.engine.is_playing());
    assert!(h
        .engine
        .take_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::Error { message } if message == "decode failed")));
}

#[test]
fn position_is_sampled_only_while_playing() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();

    h.set_position(0, 5.0);
    h.engine.tick();
    assert_eq!(h.engine.current_time(), 5.0);

    h.engine.pause();
    h.set_position(0, 9.0);
    h.engine.tick();
    assert_eq!(h.engine.current_time(), 5.0);
}

// ============================================================================
// Transport intents
// ============================================================================

#[test]
fn volume_reaches_the_sink_clamped() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();

    h.engine.set_volume(0.5);
    assert_eq!(h.sink(0).lock().unwrap().volume, 0.5);

    h.engine.set_volume(2.0);
    assert_eq!(h.sink(0).lock().unwrap().volume, 1.0);

    h.engine.set_volume(f32::NAN);
    assert_eq!(h.sink(0).lock().unwrap().volume, 0.0);
}

#[test]
fn seek_clamps_against_the_decoded_duration() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();
    h.push_event(0, SinkEvent::MetadataReady { duration: 100.0 });
    h.engine.tick();

    h.engine.seek(250.0);
    assert_eq!(h.engine.current_time(), 100.0);

    h.engine.seek(-10.0);
    assert_eq!(h.engine.current_time(), 0.0);

    h.engine.seek_percent(0.25);
    assert_eq!(h.engine.current_time(), 25.0);
}

#[test]
fn seek_with_unknown_duration_lands_on_zero() {
    let mut h = Harness::new();
    h.engine.play(Track::new("a", "/audio/a.mp3", 0.0)).unwrap();

    h.engine.seek(50.0);
    assert_eq!(h.engine.current_time(), 0.0);
}

#[test]
fn primary_sink_is_reused_across_track_changes() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();
    h.engine.play(track("b")).unwrap();
    h.engine.play(track("c")).unwrap();

    assert_eq!(h.sink_count(), 1);
    assert_eq!(h.sink(0).lock().unwrap().load_count, 3);
    assert_eq!(
        h.sink(0).lock().unwrap().loaded.as_deref(),
        Some("/audio/c.mp3")
    );
}

// ============================================================================
// Mode switching and stems
// ============================================================================

#[test]
fn mode_switch_reuses_the_cached_primary_sink() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();
    assert_eq!(h.sink_count(), 1);

    h.engine.load_stem_set(stem_set()).unwrap();
    assert_eq!(h.sink_count(), 4);
    assert!(h.sink(0).lock().unwrap().paused);

    // Back to single-track: the primary element comes out of the cache
    h.engine.play(track("b")).unwrap();
    assert_eq!(h.sink_count(), 4);
    assert!(!h.sink(0).lock().unwrap().paused);
    // Stem sinks were all paused on teardown
    for index in 1..4 {
        assert!(h.sink(index).lock().unwrap().paused);
    }
}

#[test]
fn queue_navigation_closes_an_open_stem_set() {
    let mut h = Harness::new();
    h.engine.set_queue(vec![track("a"), track("b")]).unwrap();
    h.engine.load_stem_set(stem_set()).unwrap();
    assert!(h.engine.play_all_toggle());

    h.engine.next().unwrap();

    // Only the single-track transport is left running
    assert!(!h.engine.has_stem_set());
    assert_eq!(h.sink_count(), 4);
    assert!(!h.sink(0).lock().unwrap().paused);
    for index in 1..4 {
        assert!(h.sink(index).lock().unwrap().paused);
    }
    assert_eq!(
        h.sink(0).lock().unwrap().loaded.as_deref(),
        Some("/audio/b.mp3")
    );
}

#[test]
fn stem_master_duration_is_the_max_reported() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();

    h.push_event(0, SinkEvent::MetadataReady { duration: 200.0 });
    h.push_event(1, SinkEvent::MetadataReady { duration: 201.5 });
    h.push_event(2, SinkEvent::MetadataReady { duration: 199.0 });
    h.engine.tick();

    let (_, duration, ready) = h.engine.stem_transport().unwrap();
    assert_eq!(duration, 201.5);
    assert!(ready);
}

#[test]
fn reference_sink_drives_the_stem_transport() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();
    assert!(h.engine.play_all_toggle());

    h.set_position(0, 42.0);
    h.set_position(1, 40.5);
    h.engine.tick();
    let (position, _, _) = h.engine.stem_transport().unwrap();
    assert_eq!(position, 42.0);

    // A non-reference sink ending does not stop the set
    h.push_event(1, SinkEvent::Ended);
    h.engine.tick();
    assert!(h.engine.is_playing());

    // The reference sink ending does
    h.push_event(0, SinkEvent::Ended);
    h.engine.tick();
    assert!(!h.engine.is_playing());
}

#[test]
fn seek_all_scales_by_master_duration_and_hits_every_sink() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();
    h.push_event(0, SinkEvent::MetadataReady { duration: 100.0 });
    h.engine.tick();

    h.engine.seek_all(0.25);
    for index in 0..3 {
        assert_eq!(h.sink(index).lock().unwrap().position, 25.0);
    }

    h.engine.seek_all(4.0);
    assert_eq!(h.sink(0).lock().unwrap().position, 100.0);
}

#[test]
fn mixer_gains_follow_solo_and_mute_rules() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();

    fn volume(h: &Harness, index: usize) -> f32 {
        h.sink(index).lock().unwrap().volume
    }

    // Fresh set: everything at full volume
    assert_eq!((volume(&h, 0), volume(&h, 1), volume(&h, 2)), (1.0, 1.0, 1.0));

    h.engine.set_stem_volume(StemType::Drums, 0.5);
    assert_eq!(volume(&h, 1), 0.5);

    // Solo vocals silences every other stem, own volumes retained
    h.engine.toggle_solo(StemType::Vocals);
    assert_eq!((volume(&h, 0), volume(&h, 1), volume(&h, 2)), (1.0, 0.0, 0.0));
    assert_eq!(h.engine.soloed_stem(), Some(StemType::Vocals));

    // Mute wins over solo
    h.engine.toggle_mute(StemType::Vocals);
    assert_eq!(volume(&h, 0), 0.0);

    // Solo off: drums come back at their own volume, vocals stay muted
    h.engine.toggle_solo(StemType::Vocals);
    assert_eq!((volume(&h, 0), volume(&h, 1), volume(&h, 2)), (0.0, 0.5, 1.0));

    let mix = h.engine.stem_mix();
    assert_eq!(mix.len(), 3);
    assert!(mix[0].muted);
    assert_eq!(mix[1].volume, 0.5);
}

#[test]
fn mixer_toggles_never_touch_the_transport() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();
    h.engine.play_all_toggle();

    fn load_counts(h: &Harness) -> Vec<usize> {
        (0..3).map(|i| h.sink(i).lock().unwrap().load_count).collect()
    }
    let before = load_counts(&h);

    h.engine.toggle_mute(StemType::Bass);
    h.engine.toggle_solo(StemType::Drums);
    h.engine.set_stem_volume(StemType::Vocals, 0.2);

    assert_eq!(load_counts(&h), before);
    assert!(h.engine.is_playing());
    for index in 0..3 {
        assert!(!h.sink(index).lock().unwrap().paused);
    }
}

#[test]
fn replacing_a_stem_set_tears_the_old_one_down() {
    let mut h = Harness::new();
    h.engine.load_stem_set(stem_set()).unwrap();
    h.engine.play_all_toggle();

    h.engine
        .load_stem_set(vec![StemTrack::new(
            "u",
            StemType::Instrumental,
            "/stems/inst.wav",
        )])
        .unwrap();

    assert_eq!(h.sink_count(), 4);
    for index in 0..3 {
        assert!(h.sink(index).lock().unwrap().paused);
    }
    assert_eq!(h.engine.stem_mix().len(), 1);
    assert!(!h.engine.is_playing());
}

// ============================================================================
// Visualizer
// ============================================================================

#[test]
fn analyzer_feeds_the_bars_while_playing() {
    let mut h = Harness::with_analyzer(Some(0.8));
    h.engine.play(track("a")).unwrap();

    for _ in 0..60 {
        h.engine.tick();
    }
    for &bar in h.engine.visualizer_bars() {
        assert!(bar > 0.5, "bar stuck at {bar}");
        assert!(bar <= 1.0);
    }
}

#[test]
fn blocked_analyzer_falls_back_to_the_idle_animation() {
    let mut h = Harness::new(); // analyzer refused
    h.engine.play(track("a")).unwrap();

    for _ in 0..60 {
        h.engine.tick();
    }
    let bars = h.engine.visualizer_bars();
    assert!(bars.iter().all(|&b| b >= 0.04));
    // The idle waveform lifts at least part of the field well off the floor
    assert!(bars.iter().any(|&b| b > 0.1));
}

#[test]
fn paused_bars_settle_onto_the_floor() {
    let mut h = Harness::with_analyzer(Some(0.8));
    h.engine.play(track("a")).unwrap();
    for _ in 0..30 {
        h.engine.tick();
    }

    h.engine.pause();
    for _ in 0..200 {
        h.engine.tick();
    }
    for &bar in h.engine.visualizer_bars() {
        assert!(bar >= 0.04);
        assert!(bar < 0.08, "bar still at {bar}");
    }
}

// ============================================================================
// Queue behavior through the full engine
// ============================================================================

#[test]
fn removing_the_last_entry_stops_the_sink() {
    let mut h = Harness::new();
    h.engine.play(track("a")).unwrap();

    h.engine.remove_from_queue(0).unwrap();
    assert!(h.sink(0).lock().unwrap().paused);
    assert_eq!(h.engine.queue_cursor(), None);
}

#[test]
fn play_by_id_moves_the_cursor_instead_of_duplicating() {
    let mut h = Harness::new();
    h.engine
        .set_queue(vec![track("a"), track("b"), track("c")])
        .unwrap();

    h.engine.play(track("b")).unwrap();
    assert_eq!(h.engine.queue().len(), 3);
    assert_eq!(h.engine.queue_cursor(), Some(1));
    assert_eq!(
        h.sink(0).lock().unwrap().loaded.as_deref(),
        Some("/audio/b.mp3")
    );
}

#[test]
fn repeat_mode_cycles_and_shuffle_flag_are_independent() {
    let mut h = Harness::new();
    assert!(h.engine.toggle_shuffle());
    assert_eq!(h.engine.cycle_repeat(), RepeatMode::All);
    assert!(!h.engine.toggle_shuffle());
    assert_eq!(h.engine.repeat(), RepeatMode::All);
}
