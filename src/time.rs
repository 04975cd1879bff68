//! Simulation clock.
//!
//! The clock is the single timebase shared by the render loop, the timeline
//! scheduler and every animated parameter. Elapsed time only moves forward:
//! there is no pause and no reset.
//!
//! # Example
//!
//! ```ignore
//! use void_portal::time::SimulationClock;
//!
//! let mut clock = SimulationClock::new();
//!
//! // In the frame callback:
//! let (elapsed, delta) = clock.update();
//!
//! // Or, headless and deterministic:
//! clock.advance(1.0 / 60.0);
//! ```

use std::time::{Duration, Instant};

/// Monotonic elapsed-time source for the frame loop.
#[derive(Debug)]
pub struct SimulationClock {
    /// When the last wall-clock frame occurred.
    last_frame: Instant,
    /// Total elapsed time in seconds, accumulated in f64 to avoid drift.
    elapsed: f64,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Elapsed time at last FPS update.
    fps_update_elapsed: f64,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
}

impl SimulationClock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_elapsed: 0.0,
            fps_update_interval: Duration::from_millis(500),
            fixed_delta: None,
        }
    }

    /// Advance by the wall-clock time since the previous frame. Call once per frame.
    ///
    /// If a fixed delta is configured it replaces the measured one.
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(self.fixed_delta.unwrap_or(raw_delta))
    }

    /// Advance by an explicit simulated delta.
    ///
    /// Negative or non-finite deltas are treated as zero so elapsed time never
    /// decreases. A zero delta still counts a frame without moving time;
    /// [`RenderLoop::frame`](crate::RenderLoop::frame) never passes one.
    pub fn advance(&mut self, delta: f32) -> (f32, f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.delta_secs = delta;
        self.elapsed += f64::from(delta);
        self.frame_count += 1;

        let since = self.elapsed - self.fps_update_elapsed;
        if since >= self.fps_update_interval.as_secs_f64() {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = (frames_since as f64 / since) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_update_elapsed = self.elapsed;
        }

        (self.elapsed(), self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}
