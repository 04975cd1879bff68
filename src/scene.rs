//! Scene state: portal, smoke, lights, exposure, flash and the character.
//!
//! Everything here is plain data updated once per frame from a
//! [`FrameContext`]. Params that transitions animate (portal scale, light
//! reach, exposure, flash) are owned here and exposed through
//! [`Scene::choreography_targets`].

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::assets::CharacterAsset;
use crate::camera::{CameraPose, CameraRig};
use crate::choreography::{ChoreographyTargets, EXPOSURE_REST, LIGHT_DISTANCE_REST};
use crate::config::PortalConfig;
use crate::context::FrameContext;
use crate::input::Viewport;
use crate::interaction::InteractionState;
use crate::param::Param;

/// World point standing in for the character's head.
pub const HEAD_POINT: Vec3 = Vec3::new(0.0, 1.5, -6.0);
/// Fixed step for the character's animation clip.
pub const MIXER_STEP: f32 = 0.016;

/// Portal torus plus the vortex plane inside it.
#[derive(Debug)]
pub struct Portal {
    pub radius: f32,
    /// Uniform scale, tweened by transitions.
    pub scale: Param,
    pub rotation: Vec3,
}

/// Layer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmokeSettings {
    pub scale: f32,
    /// Spin rate in radians per frame before the `0.02` factor.
    pub spin_speed: f32,
    pub opacity: f32,
    pub z: f32,
}

/// Foreground, middle and background smoke.
pub const SMOKE_LAYERS: [SmokeSettings; 3] = [
    SmokeSettings {
        scale: 12.0,
        spin_speed: 0.05,
        opacity: 0.08,
        z: 1.0,
    },
    SmokeSettings {
        scale: 9.0,
        spin_speed: -0.08,
        opacity: 0.12,
        z: 0.0,
    },
    SmokeSettings {
        scale: 7.0,
        spin_speed: 0.15,
        opacity: 0.15,
        z: -1.0,
    },
];

/// One textured smoke plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmokeLayer {
    pub settings: SmokeSettings,
    pub rotation: f32,
    pub scale: f32,
}

/// Point light in front of the portal.
#[derive(Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
    /// Reach, tweened by transitions.
    pub distance: Param,
}

/// The optional figure behind the portal.
#[derive(Debug)]
pub struct Character {
    pub asset: CharacterAsset,
    pub anchor: Vec3,
    pub scale: f32,
    /// Tremor offset around the anchor, resampled every frame.
    pub shiver: Vec3,
    pub rotation: Vec3,
    /// Playhead of the animation clip.
    pub clip_time: f32,
    /// Rim light intensity.
    pub light: f32,
    rng: SmallRng,
}

impl Character {
    fn new(asset: CharacterAsset, y: f32, scale: f32, seed: u64) -> Self {
        Self {
            asset,
            anchor: Vec3::new(0.0, y, -6.0),
            scale,
            shiver: Vec3::ZERO,
            rotation: Vec3::ZERO,
            clip_time: 0.0,
            light: 0.8,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.anchor + self.shiver
    }

    fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.elapsed;
        let amplitude = 0.002 + ctx.progress * 0.008;
        self.shiver = Vec3::new(
            (self.rng.gen::<f32>() - 0.5) * amplitude,
            (self.rng.gen::<f32>() - 0.5) * amplitude,
            0.0,
        );
        self.rotation.y = (t * 0.5).sin() * 0.08;
        self.rotation.z = (t * 0.3).cos() * 0.03;

        if let Some(clip) = self.asset.clip_duration {
            self.clip_time = (self.clip_time + MIXER_STEP) % clip;
        }
    }
}

/// Everything drawn besides the particles.
#[derive(Debug)]
pub struct Scene {
    pub portal: Portal,
    pub smoke: [SmokeLayer; 3],
    pub point_light: PointLight,
    /// Rim light on the character; driven even without one.
    pub character_light: f32,
    /// Scene exposure before the progress boost and breathing.
    pub exposure: Param,
    /// White overlay opacity in `[0, 1]`.
    pub flash: Param,
    pub character: Option<Character>,
    base_scale: f32,
    character_y: f32,
    seed: u64,
}

impl Scene {
    pub fn new(config: &PortalConfig, viewport: Viewport) -> Self {
        let base_scale = viewport.tier().responsive_scale();
        Self {
            portal: Portal {
                radius: config.portal_radius,
                scale: Param::new(base_scale),
                rotation: Vec3::ZERO,
            },
            smoke: SMOKE_LAYERS.map(|settings| SmokeLayer {
                settings,
                rotation: 0.0,
                scale: settings.scale,
            }),
            point_light: PointLight {
                position: Vec3::new(0.0, 0.0, 1.5),
                intensity: 1.5,
                distance: Param::new(LIGHT_DISTANCE_REST),
            },
            character_light: 0.8,
            exposure: Param::new(EXPOSURE_REST),
            flash: Param::bounded(0.0, 0.0, 1.0),
            character: None,
            base_scale,
            character_y: config.character_y,
            seed: config.seed.unwrap_or(0x5eed),
        }
    }

    /// Portal scale for the current tier.
    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Place a loaded character behind the portal.
    pub fn attach_character(&mut self, asset: CharacterAsset) {
        log::info!("scene: character '{}' attached", asset.name);
        self.character = Some(Character::new(
            asset,
            self.character_y,
            self.base_scale,
            self.seed,
        ));
    }

    /// Handles for the transition sequences.
    pub fn choreography_targets(&self, camera: &CameraRig) -> ChoreographyTargets {
        ChoreographyTargets {
            portal_scale: self.portal.scale.handle(),
            camera_z: camera.depth_handle(),
            light_distance: self.point_light.distance.handle(),
            exposure: self.exposure.handle(),
            flash: self.flash.handle(),
        }
    }

    /// Advance one frame.
    pub fn update(&mut self, ctx: &FrameContext) {
        let t = ctx.elapsed;
        let p = ctx.progress;

        self.portal.rotation.y = (t * 0.1).sin() * 0.1;
        self.portal.rotation.z = (self.portal.rotation.z + 0.0005) % TAU;

        for (i, layer) in self.smoke.iter_mut().enumerate() {
            layer.rotation += layer.settings.spin_speed * (1.0 + p * 2.0) * 0.02;
            layer.scale = layer.settings.scale + (t * (0.2 + i as f32 * 0.1)).sin() * 0.5;
        }

        let lit = if ctx.state == InteractionState::Idle { 1.5 } else { 4.0 };
        self.point_light.intensity = lit + (t * 5.0).sin() * 0.3;
        self.character_light = 0.8 + (t * 3.0).sin() * 0.2 + p * 1.5;

        if let Some(character) = self.character.as_mut() {
            character.update(ctx);
            character.light = self.character_light;
        }
    }

    /// Follow a viewport change.
    ///
    /// The portal snaps to the new base scale only while idle; mid-transition
    /// the running sequence owns it. Returns the new base scale.
    pub fn resize(&mut self, viewport: Viewport, state: InteractionState) -> f32 {
        self.base_scale = viewport.tier().responsive_scale();
        if state == InteractionState::Idle {
            self.portal.scale.set(self.base_scale);
        }
        if let Some(character) = self.character.as_mut() {
            character.scale = self.base_scale;
        }
        self.base_scale
    }

    /// Head position in texture space, if there is a character.
    pub fn head_on_screen(&self, camera: &CameraPose) -> Option<Vec2> {
        self.character
            .as_ref()
            .map(|_| camera.project_to_screen(HEAD_POINT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(&PortalConfig::default().with_seed(1), Viewport::new(1280, 720))
    }

    #[test]
    fn test_initial_values() {
        let scene = scene();
        assert_eq!(scene.portal.scale.get(), 1.0);
        assert_eq!(scene.exposure.get(), 0.9);
        assert_eq!(scene.flash.get(), 0.0);
        assert_eq!(scene.point_light.distance.get(), 30.0);
        assert_eq!(scene.smoke[0].scale, 12.0);
        assert!(scene.character.is_none());
    }

    #[test]
    fn test_lights_follow_state_and_progress() {
        let mut scene = scene();
        scene.update(&FrameContext::at(0.0));
        assert!((scene.point_light.intensity - 1.5).abs() < 1e-6);
        assert!((scene.character_light - 0.8).abs() < 1e-6);

        let ctx = FrameContext::at(0.0)
            .with_state(InteractionState::Entered)
            .with_progress(1.0);
        scene.update(&ctx);
        assert!((scene.point_light.intensity - 4.0).abs() < 1e-6);
        assert!((scene.character_light - 2.3).abs() < 1e-6);
    }

    #[test]
    fn test_smoke_spins_faster_with_progress() {
        let mut calm = scene();
        let mut wild = scene();
        calm.update(&FrameContext::at(1.0));
        wild.update(&FrameContext::at(1.0).with_progress(1.0));
        assert!((calm.smoke[2].rotation - 0.15 * 0.02).abs() < 1e-7);
        assert!((wild.smoke[2].rotation - 0.15 * 3.0 * 0.02).abs() < 1e-7);
        assert!(wild.smoke[1].rotation < 0.0);
    }

    #[test]
    fn test_portal_rotation() {
        let mut scene = scene();
        for _ in 0..10 {
            scene.update(&FrameContext::at(2.0));
        }
        assert!((scene.portal.rotation.z - 0.005).abs() < 1e-6);
        assert!((scene.portal.rotation.y - (0.2f32).sin() * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_resize_respects_running_transition() {
        let mut scene = scene();
        scene.portal.scale.set(4.0);
        assert_eq!(scene.resize(Viewport::new(400, 800), InteractionState::Entering), 0.5);
        assert_eq!(scene.portal.scale.get(), 4.0);

        scene.resize(Viewport::new(600, 800), InteractionState::Idle);
        assert_eq!(scene.portal.scale.get(), 0.7);
    }

    #[test]
    fn test_character_shiver_stays_near_anchor() {
        let mut scene = scene();
        scene.attach_character(CharacterAsset::new("figure").with_clip(1.0));
        let ctx = FrameContext::at(1.0).with_progress(1.0);
        for _ in 0..500 {
            scene.update(&ctx);
            let c = scene.character.as_ref().unwrap();
            assert!((c.position() - c.anchor).abs().max_element() <= 0.005 + 1e-6);
        }
        let c = scene.character.as_ref().unwrap();
        assert!(c.clip_time < 1.0);
        assert_eq!(c.anchor, Vec3::new(0.0, -1.8, -6.0));
    }

    #[test]
    fn test_head_projection_only_with_character() {
        let mut scene = scene();
        let camera = CameraRig::new(&PortalConfig::default(), Viewport::new(1280, 720));
        assert!(scene.head_on_screen(&camera.pose()).is_none());

        scene.attach_character(CharacterAsset::new("figure"));
        let head = scene.head_on_screen(&camera.pose()).unwrap();
        assert!((head.x - 0.5).abs() < 1e-5);
        assert!(head.y < 0.5);
    }
}
