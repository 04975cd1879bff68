//! # Void Portal
//!
//! A real-time 3D portal experience: a metallic ring hanging in drifting
//! smoke and particles, which the viewer can step through and come back from.
//!
//! The crate separates the *what* from the *how*:
//!
//! - [`RenderLoop`] owns all state. Each frame it advances the clock, ticks
//!   the [`TimelineScheduler`], updates the [`Scene`], [`ParticleSimulation`]
//!   and [`CameraRig`], then pushes derived values through the
//!   [`ShaderUniformBridge`] to a [`RenderPipeline`].
//! - [`Choreography`] builds the intro, enter and return sequences out of
//!   tweens over shared [`Param`]s.
//! - [`InteractionStateMachine`] guards the Idle / Entering / Entered /
//!   Returning cycle so a transition can never be started twice.
//! - The host surface is a pair of traits: [`UiBoundary`] for overlay cues and
//!   [`AudioSink`] for the ambient track.
//!
//! ## Quick Start
//!
//! ```ignore
//! use void_portal::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     PortalApp::responsive()
//!         .with_asset_dir("assets")
//!         .run()
//! }
//! ```
//!
//! ## Headless
//!
//! [`RecordingPipeline`] and [`UiFlags`] let the whole experience run
//! without a window:
//!
//! ```
//! use void_portal::prelude::*;
//!
//! let config = PortalConfig::default().with_seed(7).with_particle_count(100);
//! let mut portal = RenderLoop::new(
//!     config,
//!     Viewport::new(1280, 720),
//!     RecordingPipeline::new(),
//!     UiFlags::default(),
//! );
//! portal.assets_ready(AssetSet::empty());
//! for _ in 0..10 {
//!     portal.frame(1.0 / 60.0).unwrap();
//! }
//! assert_eq!(portal.pipeline().frames().len(), 10);
//! ```

pub mod app;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod choreography;
pub mod config;
pub mod context;
pub mod easing;
pub mod error;
pub mod gpu;
pub mod input;
pub mod interaction;
pub mod param;
pub mod particles;
pub mod pipeline;
pub mod render_loop;
pub mod scene;
pub mod time;
pub mod timeline;
pub mod ui;
pub mod uniforms;

pub use app::PortalApp;
pub use assets::{AddressMode, AssetSet, CharacterAsset, LoadingProgress, TextureData};
pub use audio::{AudioCue, AudioSink, AudioTrack, PlaybackState};
pub use camera::{CameraPose, CameraRig};
pub use choreography::{Choreography, ChoreographyTargets};
pub use config::{DeviceTier, EffectConfig, PortalConfig};
pub use context::FrameContext;
pub use easing::Ease;
pub use error::{AppError, AssetError, AudioError, ConfigError, GpuError, RenderError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::WgpuPipeline;
pub use input::{Action, Input, Pointer, Viewport};
pub use interaction::{InteractionState, InteractionStateMachine, TransitionScript};
pub use param::{Param, ParamRef};
pub use particles::{ParticleGpu, ParticleSimulation};
pub use pipeline::{FrameOutput, RecordedFrame, RecordingPipeline, RenderPipeline};
pub use render_loop::RenderLoop;
pub use scene::Scene;
pub use time::SimulationClock;
pub use timeline::{Cue, SchedulerEvent, Sequence, SequenceId, TimelineScheduler};
pub use ui::{UiBoundary, UiCue, UiElement, UiFlags, UiOverlay};
pub use uniforms::{FrameUniforms, ShaderUniformBridge, Stage, UniformSet, UniformValue};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use void_portal::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::PortalApp;
    pub use crate::assets::{AssetSet, CharacterAsset};
    pub use crate::audio::AudioSink;
    pub use crate::config::PortalConfig;
    pub use crate::error::AppError;
    pub use crate::input::{Action, Viewport};
    pub use crate::interaction::InteractionState;
    pub use crate::pipeline::{RecordingPipeline, RenderPipeline};
    pub use crate::render_loop::RenderLoop;
    pub use crate::ui::{UiBoundary, UiCue, UiFlags};
    pub use crate::{Vec2, Vec3, Vec4};
}
