//! Per-frame context.

use glam::Vec2;

use crate::input::Viewport;
use crate::interaction::InteractionState;

/// Snapshot of everything a per-frame update may read.
///
/// Built once per frame by the render loop, after the clock and the
/// scheduler have advanced, and passed by reference to the particle
/// simulation, scene, camera rig and uniform bridge.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Frame index, starting at 1.
    pub frame: u64,
    /// Transition progress in `[0, 1]`.
    pub progress: f32,
    /// Smoothed pointer in NDC.
    pub pointer: Vec2,
    pub state: InteractionState,
    pub viewport: Viewport,
}

impl FrameContext {
    /// Context for a resting scene at time `elapsed`. Mostly useful in tests.
    pub fn at(elapsed: f32) -> Self {
        Self {
            elapsed,
            delta: 1.0 / 60.0,
            frame: 1,
            progress: 0.0,
            pointer: Vec2::ZERO,
            state: InteractionState::Idle,
            viewport: Viewport::default(),
        }
    }

    /// Same context with a different progress.
    pub fn with_progress(mut self, progress: f32) -> Self {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Same context with a different interaction state.
    pub fn with_state(mut self, state: InteractionState) -> Self {
        self.state = state;
        self
    }

    /// Same context with a different pointer.
    pub fn with_pointer(mut self, pointer: Vec2) -> Self {
        self.pointer = pointer;
        self
    }

    /// Same context with a different viewport.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}
