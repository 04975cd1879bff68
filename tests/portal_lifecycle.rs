//! Integration tests for the full portal lifecycle.
//!
//! These drive a headless [`RenderLoop`] frame by frame and check what the
//! render pipeline, UI boundary and audio sink observe.

use std::cell::RefCell;
use std::rc::Rc;

use void_portal::prelude::*;
use void_portal::{AudioError, CharacterAsset, PlaybackState};

const DT: f32 = 1.0 / 60.0;

fn config() -> PortalConfig {
    PortalConfig::default().with_seed(11).with_particle_count(200)
}

fn headless<U: UiBoundary>(config: PortalConfig, ui: U) -> RenderLoop<RecordingPipeline, U> {
    RenderLoop::new(config, Viewport::new(1280, 720), RecordingPipeline::new(), ui)
}

fn run<P: RenderPipeline, U: UiBoundary>(portal: &mut RenderLoop<P, U>, seconds: f32) {
    let frames = (seconds * 60.0).round() as usize;
    for _ in 0..frames {
        portal.frame(DT).unwrap();
    }
}

// ============================================================================
// Test doubles
// ============================================================================

/// Remembers every cue in arrival order.
#[derive(Default)]
struct CueLog {
    cues: Vec<UiCue>,
}

impl UiBoundary for CueLog {
    fn apply(&mut self, cue: UiCue) {
        self.cues.push(cue);
    }
}

impl CueLog {
    fn position(&self, cue: UiCue) -> usize {
        self.cues
            .iter()
            .position(|&c| c == cue)
            .unwrap_or_else(|| panic!("{cue:?} never fired: {:?}", self.cues))
    }
}

#[derive(Default)]
struct SinkState {
    deny: bool,
    plays: u32,
    pauses: u32,
    volume: f32,
}

struct SharedSink(Rc<RefCell<SinkState>>);

impl AudioSink for SharedSink {
    fn play(&mut self) -> Result<(), AudioError> {
        let mut state = self.0.borrow_mut();
        state.plays += 1;
        if state.deny {
            return Err(AudioError::PlaybackDenied("autoplay blocked".into()));
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_loading_holds_idle() {
    let mut portal = headless(config(), UiFlags::default());
    run(&mut portal, 1.0);
    portal.handle_action(Action::Enter);
    run(&mut portal, 1.0);

    assert_eq!(portal.state(), InteractionState::Idle);
    assert!(portal.ui().loading_screen_visible);
    assert_eq!(portal.pipeline().frames().len(), 120);
}

#[test]
fn test_ui_cue_order_over_a_cycle() {
    let mut portal = headless(config(), CueLog::default());
    portal.assets_ready(AssetSet::empty());
    run(&mut portal, 2.5);
    portal.handle_action(Action::Enter);
    run(&mut portal, 7.0);
    portal.handle_action(Action::Return);
    run(&mut portal, 4.5);

    let log = portal.ui();
    assert_eq!(log.cues[0], UiCue::HideLoadingScreen);
    assert!(log.position(UiCue::HideIntro) < log.position(UiCue::ShowDownload));
    assert!(log.position(UiCue::ShowSoundToggle) < log.position(UiCue::HideDownload));
    assert!(log.position(UiCue::HideDownload) < log.position(UiCue::RestoreIntro));
    assert_eq!(log.cues.len(), 6);
}

#[test]
fn test_effects_rise_while_entering() {
    let mut portal = headless(config(), UiFlags::default());
    portal.assets_ready(AssetSet::empty());
    run(&mut portal, 2.5);
    let start = portal.pipeline().frames().len();

    assert!(portal.trigger_enter());
    while portal.state() == InteractionState::Entering {
        portal.frame(DT).unwrap();
    }
    assert_eq!(portal.state(), InteractionState::Entered);

    let frames = &portal.pipeline().frames()[start..];
    assert!(frames.windows(2).all(|w| w[1].progress >= w[0].progress));
    assert!(frames.windows(2).all(|w| w[1].bloom >= w[0].bloom));
    assert!(frames.windows(2).all(|w| w[1].hallucination >= w[0].hallucination));

    let first = &frames[0];
    let last = portal.pipeline().last().unwrap();
    assert!(last.bloom > first.bloom);
    assert!(last.camera_z < first.camera_z);
}

#[test]
fn test_transitions_cannot_overlap() {
    let mut portal = headless(config(), UiFlags::default());
    portal.assets_ready(AssetSet::empty());
    run(&mut portal, 2.5);

    assert!(!portal.trigger_return());
    assert!(portal.trigger_enter());
    run(&mut portal, 1.0);
    assert!(!portal.trigger_enter());
    assert!(!portal.trigger_return());
    assert_eq!(portal.state(), InteractionState::Entering);

    run(&mut portal, 6.0);
    assert!(portal.trigger_return());
    run(&mut portal, 1.0);
    assert!(!portal.trigger_enter());
    assert!(!portal.trigger_return());
    assert_eq!(portal.state(), InteractionState::Returning);

    run(&mut portal, 3.5);
    assert_eq!(portal.state(), InteractionState::Idle);
    assert!(portal.trigger_enter());
}

#[test]
fn test_particles_stay_inside_sphere() {
    let config = config();
    let spread = config.particle_spread;
    let mut portal = headless(config, UiFlags::default());
    portal.assets_ready(AssetSet::empty());
    run(&mut portal, 2.5);
    portal.trigger_enter();

    for _ in 0..600 {
        portal.frame(DT).unwrap();
        assert!(portal
            .particles()
            .particles()
            .iter()
            .all(|p| p.position.length() <= spread + 1e-3));
    }
}

#[test]
fn test_audio_fades_with_the_cycle() {
    let state = Rc::new(RefCell::new(SinkState::default()));
    let assets = AssetSet::empty()
        .with_character(CharacterAsset::new("figure"))
        .with_audio(Box::new(SharedSink(state.clone())));

    let mut portal = headless(config(), UiFlags::default());
    portal.assets_ready(assets);
    run(&mut portal, 2.5);
    assert_eq!(state.borrow().plays, 0);

    portal.trigger_enter();
    run(&mut portal, 9.0);
    assert_eq!(state.borrow().plays, 1);
    assert!(state.borrow().volume > 0.0);
    assert_eq!(portal.audio().map(|a| a.playback()), Some(PlaybackState::Playing));

    portal.trigger_return();
    run(&mut portal, 4.5);
    assert_eq!(state.borrow().pauses, 1);
    assert_eq!(state.borrow().volume, 0.0);
    assert_eq!(portal.audio().map(|a| a.playback()), Some(PlaybackState::Paused));
}

#[test]
fn test_sound_toggle_while_entered() {
    let state = Rc::new(RefCell::new(SinkState::default()));
    let mut portal = headless(config(), UiFlags::default());
    portal.assets_ready(AssetSet::empty().with_audio(Box::new(SharedSink(state.clone()))));
    run(&mut portal, 2.5);
    portal.trigger_enter();
    run(&mut portal, 9.0);

    portal.handle_action(Action::ToggleSound);
    run(&mut portal, 2.5);
    assert_eq!(state.borrow().volume, 0.0);
    assert_eq!(state.borrow().pauses, 1);

    portal.handle_action(Action::ToggleSound);
    run(&mut portal, 1.0);
    assert_eq!(state.borrow().plays, 2);
    assert!(state.borrow().volume > 0.0);
}

#[test]
fn test_denied_playback_retried_on_toggle() {
    let state = Rc::new(RefCell::new(SinkState {
        deny: true,
        ..SinkState::default()
    }));
    let assets = AssetSet::empty().with_audio(Box::new(SharedSink(state.clone())));
    let mut portal = headless(config(), UiFlags::default());
    portal.assets_ready(assets);
    run(&mut portal, 2.5);
    portal.trigger_enter();
    run(&mut portal, 7.0);
    assert_eq!(state.borrow().plays, 1);
    assert_eq!(portal.audio().map(|a| a.playback()), Some(PlaybackState::NotStarted));

    state.borrow_mut().deny = false;
    portal.handle_action(Action::ToggleSound);
    assert_eq!(state.borrow().plays, 2);
    assert_eq!(portal.audio().map(|a| a.playback()), Some(PlaybackState::Playing));
    run(&mut portal, 1.0);
    assert!(state.borrow().volume > 0.0);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_json_config_drives_the_loop() {
    let config = PortalConfig::from_json(r#"{ "particle_count": 10, "seed": 3 }"#).unwrap();
    let mut portal = headless(config, UiFlags::default());
    run(&mut portal, 0.1);
    assert!(portal.pipeline().frames().iter().all(|f| f.particles == 10));
}

#[test]
fn test_narrow_viewport_defaults() {
    let narrow = PortalConfig::for_viewport(Viewport::new(400, 800));
    let wide = PortalConfig::for_viewport(Viewport::new(1920, 1080));
    assert!(narrow.particle_count < wide.particle_count);
    assert!(narrow.camera_z > wide.camera_z);
}
