//! Shader uniforms for every render stage.
//!
//! The [`ShaderUniformBridge`] is the one place simulation state turns into
//! shader parameters. Each frame it rebuilds a [`UniformSet`] per [`Stage`]
//! from the frame context, scene, particle spin and camera pose, and hands
//! the result to the render pipeline. Nothing else writes uniform values.
//!
//! A set is an ordered list of named values. The order fixes the WGSL struct
//! layout, so the same set can generate its struct definition
//! ([`UniformSet::to_wgsl_fields`]) and its buffer contents
//! ([`UniformSet::to_bytes`]).
//!
//! # Effect levels
//!
//! All post effects move linearly with progress `p`:
//!
//! | stage         | value                                  |
//! |---------------|----------------------------------------|
//! | bloom         | `0.8 + p * 2.0`                        |
//! | chromatic     | `0.001 + p * 0.006`                    |
//! | vignette      | `1.8 + p * 1.2`                        |
//! | afterimage    | `0.92 - p * 0.07`                      |
//! | hallucination | `0.08 + p * 0.72`                      |
//! | distortion    | `0.2 + p * 1.5`                        |

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::collections::HashMap;

use crate::camera::CameraPose;
use crate::config::EffectConfig;
use crate::context::FrameContext;
use crate::scene::Scene;

/// Supported uniform value types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    U32(u32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    /// WGSL type name for this value.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            UniformValue::F32(_) => "f32",
            UniformValue::I32(_) => "i32",
            UniformValue::U32(_) => "u32",
            UniformValue::Vec2(_) => "vec2<f32>",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
            UniformValue::Mat4(_) => "mat4x4<f32>",
        }
    }

    /// Alignment in a uniform buffer.
    pub fn align(&self) -> usize {
        match self {
            UniformValue::Mat4(_) | UniformValue::Vec4(_) | UniformValue::Vec3(_) => 16,
            UniformValue::Vec2(_) => 8,
            _ => 4,
        }
    }

    /// Byte size (without trailing padding).
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::F32(_) | UniformValue::I32(_) | UniformValue::U32(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 12, // 12 bytes, aligned to 16
            UniformValue::Vec4(_) => 16,
            UniformValue::Mat4(_) => 64,
        }
    }

    /// Append this value to a byte buffer.
    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            UniformValue::F32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::I32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::U32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::Vec2(v) => buf.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            // A following scalar may sit in the vec3's trailing bytes
            UniformValue::Vec3(v) => buf.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => buf.extend_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat4(m) => {
                buf.extend_from_slice(bytemuck::cast_slice(&m.to_cols_array()))
            }
        }
    }

    /// The value as a scalar, if it is one.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            UniformValue::F32(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::I32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

/// Ordered name → value mapping for one stage.
#[derive(Clone, Debug, Default)]
pub struct UniformSet {
    /// Order matters for WGSL struct layout.
    values: Vec<(&'static str, UniformValue)>,
    indices: HashMap<&'static str, usize>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a value.
    pub(crate) fn set<V: Into<UniformValue>>(&mut self, name: &'static str, value: V) {
        let value = value.into();
        if let Some(&idx) = self.indices.get(name) {
            self.values[idx].1 = value;
        } else {
            self.indices.insert(name, self.values.len());
            self.values.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.indices.get(name).map(|&idx| &self.values[idx].1)
    }

    /// Shorthand for scalar lookups.
    pub fn f32(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(UniformValue::as_f32)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// WGSL struct fields, one per line.
    pub fn to_wgsl_fields(&self) -> String {
        self.values
            .iter()
            .map(|(name, value)| format!("    {}: {},", name, value.wgsl_type()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize for upload, padded to 16 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (_, value) in &self.values {
            while buf.len() % value.align() != 0 {
                buf.push(0);
            }
            value.write_bytes(&mut buf);
        }
        while buf.len() % 16 != 0 {
            buf.push(0);
        }
        buf
    }

    /// Buffer size `to_bytes` produces.
    pub fn byte_size(&self) -> usize {
        self.to_bytes().len()
    }
}

/// Render stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Scene geometry: smoke, portal, core, particles.
    Base,
    Bloom,
    Grain,
    ChromaticAberration,
    Vignette,
    Hallucination,
    Afterimage,
    /// Warp around the character's head. Also composites the flash overlay.
    LocalDistortion,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Base,
        Stage::Bloom,
        Stage::Grain,
        Stage::ChromaticAberration,
        Stage::Vignette,
        Stage::Hallucination,
        Stage::Afterimage,
        Stage::LocalDistortion,
    ];

    /// Post passes, everything after the base pass.
    pub const POST: [Stage; 7] = [
        Stage::Bloom,
        Stage::Grain,
        Stage::ChromaticAberration,
        Stage::Vignette,
        Stage::Hallucination,
        Stage::Afterimage,
        Stage::LocalDistortion,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Name used for GPU labels and logs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Base => "base",
            Stage::Bloom => "bloom",
            Stage::Grain => "grain",
            Stage::ChromaticAberration => "chromatic aberration",
            Stage::Vignette => "vignette",
            Stage::Hallucination => "hallucination",
            Stage::Afterimage => "afterimage",
            Stage::LocalDistortion => "local distortion",
        }
    }
}

/// Uniform sets of every stage for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameUniforms {
    sets: [UniformSet; 8],
    frame: u64,
}

impl FrameUniforms {
    pub fn stage(&self, stage: Stage) -> &UniformSet {
        &self.sets[stage.index()]
    }

    /// Frame these values were computed for.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stage, &UniformSet)> {
        Stage::ALL.into_iter().map(move |s| (s, self.stage(s)))
    }
}

/// Post effect strengths at a given progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectLevels {
    pub bloom: f32,
    pub chromatic: f32,
    pub vignette: f32,
    pub afterimage_damp: f32,
    pub hallucination: f32,
    pub distortion: f32,
}

impl EffectLevels {
    pub fn at(effects: &EffectConfig, progress: f32) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            bloom: effects.bloom_base + (effects.bloom_peak - effects.bloom_base) * p,
            chromatic: effects.chromatic_base + p * effects.chromatic_gain,
            vignette: effects.vignette_base + p * effects.vignette_gain,
            afterimage_damp: effects.afterimage_damp - p * effects.afterimage_falloff,
            hallucination: effects.hallucination_base
                + (effects.hallucination_max - effects.hallucination_base) * p,
            distortion: effects.distortion_base + p * effects.distortion_gain,
        }
    }
}

/// Tone-mapping exposure: scene exposure, boosted by progress, breathing.
pub fn tone_mapping_exposure(exposure: f32, progress: f32, elapsed: f32) -> f32 {
    exposure + progress * 0.4 + (elapsed * 1.5).sin() * 0.05
}

/// Portal material brightness before the interaction boost.
const PORTAL_INTENSITY: f32 = 1.0;

/// Sole writer of shader uniforms.
#[derive(Debug)]
pub struct ShaderUniformBridge {
    effects: EffectConfig,
    uniforms: FrameUniforms,
}

impl ShaderUniformBridge {
    pub fn new(effects: EffectConfig) -> Self {
        Self {
            effects,
            uniforms: FrameUniforms::default(),
        }
    }

    /// Values from the last push.
    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Recompute every stage for this frame.
    ///
    /// Each set is cleared and rebuilt, so no value survives from an earlier
    /// frame.
    pub fn push(
        &mut self,
        ctx: &FrameContext,
        scene: &Scene,
        particle_spin: f32,
        camera: &CameraPose,
    ) -> &FrameUniforms {
        let t = ctx.elapsed;
        let p = ctx.progress;
        let levels = EffectLevels::at(&self.effects, p);
        let fx = &self.effects;

        for set in &mut self.uniforms.sets {
            set.values.clear();
            set.indices.clear();
        }
        self.uniforms.frame = ctx.frame;
        let sets = &mut self.uniforms.sets;

        let portal = &scene.portal;
        let portal_model = Mat4::from_scale_rotation_translation(
            Vec3::splat(portal.scale.get()),
            Quat::from_euler(glam::EulerRot::XYZ, 0.0, portal.rotation.y, portal.rotation.z),
            Vec3::ZERO,
        );
        let base = &mut sets[Stage::Base.index()];
        base.set("view_proj", camera.view_proj());
        base.set("portal_model", portal_model);
        base.set("particle_model", Mat4::from_rotation_z(particle_spin));
        base.set("camera_position", camera.position);
        base.set("time", t);
        base.set("interaction", p);
        base.set("mouse", ctx.pointer);
        base.set("intensity", PORTAL_INTENSITY);
        base.set("exposure", tone_mapping_exposure(scene.exposure.get(), p, t));
        base.set("light_intensity", scene.point_light.intensity);
        base.set("light_distance", scene.point_light.distance.get());
        base.set("character_light", scene.character_light);
        base.set("portal_radius", portal.radius);
        base.set(
            "resolution",
            Vec2::new(ctx.viewport.width as f32, ctx.viewport.height as f32).max(Vec2::ONE),
        );
        base.set("smoke_rotation", Vec3::from(scene.smoke.map(|l| l.rotation)));
        base.set("smoke_scale", Vec3::from(scene.smoke.map(|l| l.scale)));
        base.set("smoke_opacity", Vec3::from(scene.smoke.map(|l| l.settings.opacity)));
        base.set("smoke_depth", Vec3::from(scene.smoke.map(|l| l.settings.z)));

        let bloom = &mut sets[Stage::Bloom.index()];
        bloom.set("strength", levels.bloom);
        bloom.set("radius", fx.bloom_radius);
        bloom.set("threshold", fx.bloom_threshold);

        let grain = &mut sets[Stage::Grain.index()];
        grain.set("time", t);
        grain.set("intensity", fx.grain_intensity);

        sets[Stage::ChromaticAberration.index()].set("amount", levels.chromatic);

        let vignette = &mut sets[Stage::Vignette.index()];
        vignette.set("offset", fx.vignette_offset);
        vignette.set("darkness", levels.vignette);

        let hallucination = &mut sets[Stage::Hallucination.index()];
        hallucination.set("time", t);
        hallucination.set("intensity", levels.hallucination);

        sets[Stage::Afterimage.index()].set("damp", levels.afterimage_damp);

        let head = scene.head_on_screen(camera);
        let distortion = &mut sets[Stage::LocalDistortion.index()];
        distortion.set("char_pos", head.unwrap_or(Vec2::splat(0.5)));
        distortion.set("time", t);
        distortion.set("intensity", if head.is_some() { levels.distortion } else { 0.0 });
        distortion.set("flash", scene.flash.get());

        &self.uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::CharacterAsset;
    use crate::camera::CameraRig;
    use crate::config::PortalConfig;
    use crate::input::Viewport;

    fn push_at(
        bridge: &mut ShaderUniformBridge,
        scene: &Scene,
        ctx: FrameContext,
    ) -> FrameUniforms {
        let camera = CameraRig::new(&PortalConfig::default(), Viewport::default());
        bridge.push(&ctx, scene, 0.0, &camera.pose()).clone()
    }

    #[test]
    fn test_uniform_layout() {
        let mut set = UniformSet::new();
        set.set("a", 1.0f32);
        set.set("b", Vec3::ONE);
        set.set("c", 2.0f32);
        set.set("m", Mat4::IDENTITY);
        // a @0, b @16 (aligned), c @28 (in vec3 tail), m @32
        let bytes = set.to_bytes();
        assert_eq!(bytes.len(), 96);
        assert_eq!(&bytes[28..32], &2.0f32.to_le_bytes());
        assert_eq!(set.to_wgsl_fields().lines().count(), 4);
        assert!(set.to_wgsl_fields().contains("m: mat4x4<f32>,"));
    }

    #[test]
    fn test_set_updates_in_place() {
        let mut set = UniformSet::new();
        set.set("x", 1.0f32);
        set.set("y", 2.0f32);
        set.set("x", 3.0f32);
        assert_eq!(set.len(), 2);
        assert_eq!(set.f32("x"), Some(3.0));
        assert_eq!(set.iter().next().map(|(n, _)| n), Some("x"));
    }

    #[test]
    fn test_effect_levels_at_extremes() {
        let fx = EffectConfig::default();
        let rest = EffectLevels::at(&fx, 0.0);
        assert_eq!(rest.chromatic, 0.001);
        assert_eq!(rest.vignette, 1.8);
        assert_eq!(rest.afterimage_damp, 0.92);
        assert_eq!(rest.hallucination, 0.08);

        let peak = EffectLevels::at(&fx, 1.0);
        assert!((peak.bloom - 2.8).abs() < 1e-6);
        assert!((peak.chromatic - 0.007).abs() < 1e-6);
        assert!((peak.vignette - 3.0).abs() < 1e-6);
        assert!((peak.afterimage_damp - 0.85).abs() < 1e-6);
        assert!((peak.hallucination - 0.8).abs() < 1e-6);
        assert!((peak.distortion - 1.7).abs() < 1e-6);
    }

    #[test]
    fn test_every_stage_written_each_frame() {
        let config = PortalConfig::default();
        let scene = Scene::new(&config, Viewport::default());
        let mut bridge = ShaderUniformBridge::new(config.effects.clone());

        let first = push_at(&mut bridge, &scene, FrameContext::at(1.0));
        let mut ctx = FrameContext::at(2.0).with_progress(0.5);
        ctx.frame = 2;
        let second = push_at(&mut bridge, &scene, ctx);

        assert_eq!(second.frame(), 2);
        for (stage, set) in second.iter() {
            assert!(!set.is_empty(), "{} is empty", stage.label());
            assert_eq!(set.len(), first.stage(stage).len());
        }
        assert_eq!(second.stage(Stage::Base).f32("time"), Some(2.0));
        assert_eq!(second.stage(Stage::Hallucination).f32("time"), Some(2.0));
        assert_eq!(second.stage(Stage::Base).f32("interaction"), Some(0.5));
    }

    #[test]
    fn test_distortion_needs_character() {
        let config = PortalConfig::default();
        let mut scene = Scene::new(&config, Viewport::default());
        let mut bridge = ShaderUniformBridge::new(config.effects.clone());

        let without = push_at(&mut bridge, &scene, FrameContext::at(1.0));
        assert_eq!(without.stage(Stage::LocalDistortion).f32("intensity"), Some(0.0));

        scene.attach_character(CharacterAsset::new("figure"));
        let with = push_at(&mut bridge, &scene, FrameContext::at(1.0).with_progress(1.0));
        let intensity = with.stage(Stage::LocalDistortion).f32("intensity").unwrap();
        assert!((intensity - 1.7).abs() < 1e-6);
    }

    #[test]
    fn test_exposure_breathes() {
        assert!((tone_mapping_exposure(0.9, 0.0, 0.0) - 0.9).abs() < 1e-6);
        assert!((tone_mapping_exposure(0.9, 1.0, 0.0) - 1.3).abs() < 1e-6);
        let t = std::f32::consts::PI / 3.0;
        assert!((tone_mapping_exposure(0.9, 0.0, t) - 0.95).abs() < 1e-6);
    }
}
