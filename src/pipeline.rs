//! Render pipeline boundary.
//!
//! The frame loop never talks to a graphics API directly. Once per frame it
//! hands a [`FrameOutput`] to whatever implements [`RenderPipeline`]: the
//! wgpu backend in [`crate::gpu`] when running in a window, or a
//! [`RecordingPipeline`] in headless runs and tests.

use crate::camera::CameraPose;
use crate::error::RenderError;
use crate::input::Viewport;
use crate::particles::ParticleGpu;
use crate::uniforms::{FrameUniforms, Stage};

/// Everything the backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput<'a> {
    /// Uniform sets for every stage, in pipeline order.
    pub uniforms: &'a FrameUniforms,
    /// Particle instances, already in GPU layout.
    pub particles: &'a [ParticleGpu],
    pub camera: CameraPose,
    pub viewport: Viewport,
}

/// An opaque chain of render passes.
pub trait RenderPipeline {
    /// Draw and present one frame.
    fn render(&mut self, frame: &FrameOutput<'_>) -> Result<(), RenderError>;

    /// Follow a viewport change. Empty viewports are ignored.
    fn resize(&mut self, viewport: Viewport);
}

/// What a [`RecordingPipeline`] saw of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub frame: u64,
    pub time: f32,
    pub progress: f32,
    pub bloom: f32,
    pub hallucination: f32,
    pub particles: usize,
    pub camera_z: f32,
}

/// Headless pipeline that remembers what it was asked to draw.
#[derive(Debug, Default)]
pub struct RecordingPipeline {
    frames: Vec<RecordedFrame>,
    viewport: Option<Viewport>,
    fail_next: Option<RenderError>,
}

impl RecordingPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    /// Last viewport passed to `resize`.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Make the next `render` call fail with `error`.
    pub fn fail_next(&mut self, error: RenderError) {
        self.fail_next = Some(error);
    }
}

impl RenderPipeline for RecordingPipeline {
    fn render(&mut self, frame: &FrameOutput<'_>) -> Result<(), RenderError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        let base = frame.uniforms.stage(Stage::Base);
        self.frames.push(RecordedFrame {
            frame: frame.uniforms.frame(),
            time: base.f32("time").unwrap_or_default(),
            progress: base.f32("interaction").unwrap_or_default(),
            bloom: frame.uniforms.stage(Stage::Bloom).f32("strength").unwrap_or_default(),
            hallucination: frame
                .uniforms
                .stage(Stage::Hallucination)
                .f32("intensity")
                .unwrap_or_default(),
            particles: frame.particles.len(),
            camera_z: frame.camera.position.z,
        });
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_empty() {
            self.viewport = Some(viewport);
        }
    }
}
