//! Camera rig.
//!
//! The camera never orbits and never looks anywhere but the origin. Its
//! position is the smoothed sum of independent contributions:
//!
//! - **breathing**: a slow Lissajous drift,
//! - **parallax**: the smoothed pointer, scaled,
//! - **jitter**: a fast tremor that only kicks in once progress passes 0.05,
//! - **depth**: a tweenable param. Transitions push it in and pull it back;
//!   while idle the rig eases it towards the resting distance itself.

use glam::{Mat4, Vec2, Vec3};

use crate::config::PortalConfig;
use crate::context::FrameContext;
use crate::input::Viewport;
use crate::interaction::InteractionState;
use crate::param::{Param, ParamRef};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
/// Progress below which the camera holds still.
const JITTER_THRESHOLD: f32 = 0.05;

/// Where the camera is and how it projects, for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to normalized device coordinates.
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_proj().project_point3(world)
    }

    /// Project a world point to texture space: `[0, 1]²`, origin top-left.
    pub fn project_to_screen(&self, world: Vec3) -> Vec2 {
        let ndc = self.project(world);
        Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5)
    }
}

/// Produces a [`CameraPose`] every frame.
#[derive(Debug)]
pub struct CameraRig {
    offset: Vec2,
    depth: Param,
    rest_z: f32,
    breathing_amplitude: f32,
    breathing_speed: f32,
    parallax: f32,
    smoothing: f32,
    fov_degrees: f32,
    aspect: f32,
}

impl CameraRig {
    /// Rig at rest for the given viewport.
    pub fn new(config: &PortalConfig, viewport: Viewport) -> Self {
        Self {
            offset: Vec2::ZERO,
            depth: Param::new(config.camera_z),
            rest_z: config.camera_z,
            breathing_amplitude: config.breathing_amplitude,
            breathing_speed: config.breathing_speed,
            parallax: config.parallax_strength,
            smoothing: config.camera_smoothing.clamp(0.0, 1.0),
            fov_degrees: viewport.tier().fov_degrees(),
            aspect: viewport.aspect(),
        }
    }

    /// Handle to the depth param for transition sequences.
    pub fn depth_handle(&self) -> ParamRef {
        self.depth.handle()
    }

    pub fn rest_z(&self) -> f32 {
        self.rest_z
    }

    /// Where x/y are heading this frame, before smoothing.
    pub fn target_offset(&self, ctx: &FrameContext) -> Vec2 {
        let t = ctx.elapsed;
        let breathing = Vec2::new(
            (t * self.breathing_speed).sin(),
            (t * self.breathing_speed * 0.8).cos(),
        ) * self.breathing_amplitude;
        let parallax = ctx.pointer * self.parallax;

        let jitter = if ctx.progress > JITTER_THRESHOLD {
            Vec2::new((t * 45.0).sin(), (t * 40.0).cos()) * 0.003 * ctx.progress
        } else {
            Vec2::ZERO
        };

        breathing + parallax + jitter
    }

    /// Advance one frame and return the new pose.
    pub fn update(&mut self, ctx: &FrameContext) -> CameraPose {
        let target = self.target_offset(ctx);
        self.offset += (target - self.offset) * self.smoothing;

        if ctx.state == InteractionState::Idle {
            let z = self.depth.get();
            self.depth.set(z + (self.rest_z - z) * self.smoothing);
        }

        self.pose()
    }

    /// Current pose without advancing.
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: Vec3::new(self.offset.x, self.offset.y, self.depth.get()),
            target: Vec3::ZERO,
            fov_y: self.fov_degrees.to_radians(),
            aspect: self.aspect,
        }
    }

    /// Follow a viewport change: aspect and field of view.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.aspect = viewport.aspect();
        self.fov_degrees = viewport.tier().fov_degrees();
    }
}
