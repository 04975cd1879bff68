//! The per-frame driver.
//!
//! [`RenderLoop`] owns every piece of simulation state and runs one frame at a
//! time, in a fixed order:
//!
//! 1. advance the clock,
//! 2. tick the scheduler and dispatch what it reports (UI cues, audio cues,
//!    transition completion),
//! 3. push the faded volume to the audio sink and smooth the pointer,
//! 4. build the [`FrameContext`],
//! 5. step particles, scene and camera,
//! 6. recompute every uniform,
//! 7. hand the frame to the [`RenderPipeline`].
//!
//! User actions only ever install sequences; the sequences change state on
//! the next ticks, on the same timebase as everything else.

use glam::Vec2;

use crate::assets::AssetSet;
use crate::audio::AudioTrack;
use crate::camera::{CameraPose, CameraRig};
use crate::choreography::Choreography;
use crate::config::PortalConfig;
use crate::context::FrameContext;
use crate::error::RenderError;
use crate::input::{Action, Pointer, Viewport};
use crate::interaction::{InteractionState, InteractionStateMachine};
use crate::particles::{ParticleGpu, ParticleSimulation};
use crate::pipeline::{FrameOutput, RenderPipeline};
use crate::scene::Scene;
use crate::time::SimulationClock;
use crate::timeline::{Cue, SchedulerEvent, SequenceId, TimelineScheduler};
use crate::ui::{UiBoundary, UiOverlay};
use crate::uniforms::{FrameUniforms, ShaderUniformBridge};

/// Single-threaded frame loop over a render pipeline `P` and a UI boundary `U`.
pub struct RenderLoop<P: RenderPipeline, U: UiBoundary> {
    config: PortalConfig,
    viewport: Viewport,
    clock: SimulationClock,
    scheduler: TimelineScheduler,
    machine: InteractionStateMachine,
    choreography: Choreography,
    particles: ParticleSimulation,
    particle_buffer: Vec<ParticleGpu>,
    scene: Scene,
    camera: CameraRig,
    pose: CameraPose,
    bridge: ShaderUniformBridge,
    /// Set once assets are in.
    audio: Option<AudioTrack>,
    /// Intro reveal in flight; entering waits for it.
    intro: Option<SequenceId>,
    overlay: UiOverlay,
    ui: U,
    pointer: Pointer,
    context: FrameContext,
    pipeline: P,
}

impl<P: RenderPipeline, U: UiBoundary> RenderLoop<P, U> {
    pub fn new(config: PortalConfig, viewport: Viewport, pipeline: P, ui: U) -> Self {
        let scene = Scene::new(&config, viewport);
        let camera = CameraRig::new(&config, viewport);
        let overlay = UiOverlay::new();
        let choreography = Choreography::new(
            &config,
            scene.base_scale(),
            scene.choreography_targets(&camera),
            &overlay,
        );
        let particles = ParticleSimulation::new(&config);
        log::info!(
            "render loop: {} particles, {:?} tier, {}x{}",
            particles.len(),
            viewport.tier(),
            viewport.width,
            viewport.height
        );

        Self {
            pose: camera.pose(),
            bridge: ShaderUniformBridge::new(config.effects.clone()),
            pointer: Pointer::new(config.pointer_smoothing),
            particle_buffer: Vec::with_capacity(particles.len()),
            context: FrameContext::at(0.0).with_viewport(viewport),
            clock: SimulationClock::new(),
            scheduler: TimelineScheduler::new(),
            machine: InteractionStateMachine::new(),
            audio: None,
            intro: None,
            config,
            viewport,
            choreography,
            particles,
            scene,
            camera,
            overlay,
            ui,
            pipeline,
        }
    }

    /// Take over loaded assets and start the intro reveal.
    ///
    /// Only the first call has an effect.
    pub fn assets_ready(&mut self, assets: AssetSet) {
        if self.audio.is_some() {
            log::debug!("render loop: assets already handed over, ignoring");
            return;
        }
        if let Some(character) = assets.character {
            self.scene.attach_character(character);
        }
        self.audio = Some(AudioTrack::new(assets.audio));
        self.intro = Some(self.scheduler.play(self.choreography.intro_sequence()));
        log::info!("render loop: assets ready, revealing intro");
    }

    /// Whether [`assets_ready`](Self::assets_ready) has been called.
    pub fn is_ready(&self) -> bool {
        self.audio.is_some()
    }

    /// Whether the intro title and enter button have finished appearing.
    pub fn is_revealed(&self) -> bool {
        self.is_ready() && !self.intro.is_some_and(|id| self.scheduler.is_active(id))
    }

    /// Run a frame on wall-clock time.
    pub fn tick(&mut self) -> Result<(), RenderError> {
        self.clock.update();
        self.run_frame()
    }

    /// Run a frame `dt` seconds after the previous one.
    ///
    /// Time only moves forward: a `dt` that is not positive and finite runs
    /// no frame at all.
    pub fn frame(&mut self, dt: f32) -> Result<(), RenderError> {
        if !(dt.is_finite() && dt > 0.0) {
            log::debug!("render loop: skipping frame with dt {dt}");
            return Ok(());
        }
        self.clock.advance(dt);
        self.run_frame()
    }

    fn run_frame(&mut self) -> Result<(), RenderError> {
        for event in self.scheduler.tick(self.clock.delta()) {
            self.dispatch(event);
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.sync();
        }
        let pointer = self.pointer.smooth();

        let ctx = FrameContext {
            elapsed: self.clock.elapsed(),
            delta: self.clock.delta(),
            frame: self.clock.frame(),
            progress: self.machine.progress(),
            pointer,
            state: self.machine.state(),
            viewport: self.viewport,
        };
        self.context = ctx;

        self.particles.step(&ctx);
        self.scene.update(&ctx);
        self.pose = self.camera.update(&ctx);

        let uniforms = self
            .bridge
            .push(&ctx, &self.scene, self.particles.spin(), &self.pose);
        self.particles.write_gpu(&mut self.particle_buffer);

        self.pipeline.render(&FrameOutput {
            uniforms,
            particles: &self.particle_buffer,
            camera: self.pose,
            viewport: self.viewport,
        })
    }

    fn dispatch(&mut self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::Cue(Cue::Ui(cue)) => self.ui.apply(cue),
            SchedulerEvent::Cue(Cue::Audio(cue)) => {
                if let Some(audio) = self.audio.as_mut() {
                    audio.handle(cue, &mut self.scheduler);
                }
            }
            SchedulerEvent::Completed(_) | SchedulerEvent::Aborted(_) => {
                self.machine.on_scheduler_event(&event);
            }
        }
    }

    /// Step through the portal. Ignored before assets are ready or outside Idle.
    pub fn trigger_enter(&mut self) -> bool {
        if !self.is_ready() {
            log::debug!("render loop: enter ignored, still loading");
            return false;
        }
        if !self.is_revealed() {
            log::debug!("render loop: enter ignored, intro still revealing");
            return false;
        }
        self.machine
            .trigger_enter(&mut self.scheduler, &self.choreography)
    }

    /// Come back out. Ignored outside Entered.
    pub fn trigger_return(&mut self) -> bool {
        self.machine
            .trigger_return(&mut self.scheduler, &self.choreography)
    }

    /// Fade the ambient track in or out.
    pub fn toggle_sound(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.toggle(&mut self.scheduler);
        }
    }

    /// Route a user action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Enter => {
                self.trigger_enter();
            }
            Action::Return => {
                self.trigger_return();
            }
            Action::ToggleSound => self.toggle_sound(),
        }
    }

    /// Record a raw pointer position in NDC.
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        self.pointer.set_raw(ndc);
    }

    /// Follow a viewport change.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.camera.resize(viewport);
        let base = self.scene.resize(viewport, self.machine.state());
        self.choreography.set_base_scale(base);
        self.pipeline.resize(viewport);
        log::debug!(
            "render loop: resized to {}x{} ({:?})",
            viewport.width,
            viewport.height,
            viewport.tier()
        );
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn progress(&self) -> f32 {
        self.machine.progress()
    }

    /// Context of the last frame.
    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Fix the frame delta for deterministic runs.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.clock.set_fixed_delta(delta);
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn particles(&self) -> &ParticleSimulation {
        &self.particles
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.pose
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        self.bridge.uniforms()
    }

    pub fn overlay(&self) -> &UiOverlay {
        &self.overlay
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// Running sequences, including audio fades and UI reveals.
    pub fn active_sequences(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }
}
