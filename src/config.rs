//! Configuration for the portal experience.
//!
//! [`PortalConfig`] holds every tunable the frame loop reads. Defaults match
//! the desktop tier; [`PortalConfig::for_viewport`] applies the narrow-screen
//! overrides (fewer particles, camera pushed back, smaller expansion).
//!
//! ```ignore
//! let config = PortalConfig::for_viewport(Viewport::new(390, 844))
//!     .with_particle_count(500)
//!     .with_expand_duration(3.0);
//! ```
//!
//! Configs can also be read from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::input::Viewport;

/// Screen class, chosen from viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceTier {
    /// Narrower than 480 px.
    SmallMobile,
    /// 480 px up to 768 px.
    Mobile,
    /// 768 px and wider.
    Desktop,
}

impl DeviceTier {
    /// Tier for a viewport width in pixels.
    pub fn from_width(width: u32) -> Self {
        if width < 480 {
            DeviceTier::SmallMobile
        } else if width < 768 {
            DeviceTier::Mobile
        } else {
            DeviceTier::Desktop
        }
    }

    /// Base scale factor for the portal and character.
    pub fn responsive_scale(self) -> f32 {
        match self {
            DeviceTier::SmallMobile => 0.5,
            DeviceTier::Mobile => 0.7,
            DeviceTier::Desktop => 1.0,
        }
    }

    /// Whether the narrow-screen overrides apply.
    pub fn is_narrow(self) -> bool {
        self != DeviceTier::Desktop
    }

    /// Vertical field of view in degrees. Wider on tall screens.
    pub fn fov_degrees(self) -> f32 {
        if self.is_narrow() {
            65.0
        } else {
            45.0
        }
    }
}

/// Post-processing parameter ranges. Each derived uniform moves linearly
/// from its base (progress 0) to its peak (progress 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub bloom_base: f32,
    pub bloom_peak: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub grain_intensity: f32,
    pub chromatic_base: f32,
    pub chromatic_gain: f32,
    pub vignette_offset: f32,
    pub vignette_base: f32,
    pub vignette_gain: f32,
    /// Afterimage persistence at rest; shrinks by `afterimage_falloff` at full progress.
    pub afterimage_damp: f32,
    pub afterimage_falloff: f32,
    pub hallucination_base: f32,
    pub hallucination_max: f32,
    pub distortion_base: f32,
    pub distortion_gain: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            bloom_base: 0.8,
            bloom_peak: 2.8,
            bloom_radius: 0.6,
            bloom_threshold: 0.4,
            grain_intensity: 0.15,
            chromatic_base: 0.001,
            chromatic_gain: 0.006,
            vignette_offset: 1.0,
            vignette_base: 1.8,
            vignette_gain: 1.2,
            afterimage_damp: 0.92,
            afterimage_falloff: 0.07,
            hallucination_base: 0.08,
            hallucination_max: 0.8,
            distortion_base: 0.2,
            distortion_gain: 1.5,
        }
    }
}

/// Every tunable of the experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub particle_count: u32,
    /// Radius of the sphere particles stay inside.
    pub particle_spread: f32,
    /// Upper bound of the random part of a particle's size.
    pub particle_size: f32,
    /// Resting camera distance.
    pub camera_z: f32,
    /// How far towards the portal the camera moves on entry.
    pub camera_push: f32,
    pub breathing_amplitude: f32,
    pub breathing_speed: f32,
    pub parallax_strength: f32,
    /// Per-frame exponential smoothing of the camera towards its target.
    pub camera_smoothing: f32,
    /// Per-frame exponential smoothing of the pointer.
    pub pointer_smoothing: f32,
    pub portal_radius: f32,
    pub portal_expand_scale: f32,
    /// Length of the main enter phase, in seconds.
    pub expand_duration: f32,
    /// Character vertical placement.
    pub character_y: f32,
    pub effects: EffectConfig,
    /// Seed for particle placement; `None` seeds from the system clock.
    pub seed: Option<u64>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            particle_count: 2500,
            particle_spread: 18.0,
            particle_size: 1.2,
            camera_z: 7.5,
            camera_push: 4.5,
            breathing_amplitude: 0.05,
            breathing_speed: 0.3,
            parallax_strength: 0.25,
            camera_smoothing: 0.05,
            pointer_smoothing: 0.08,
            portal_radius: 2.5,
            portal_expand_scale: 5.5,
            expand_duration: 4.5,
            character_y: -1.8,
            effects: EffectConfig::default(),
            seed: None,
        }
    }
}

impl PortalConfig {
    /// Defaults adjusted for the viewport's tier.
    pub fn for_viewport(viewport: Viewport) -> Self {
        let mut config = Self::default();
        if viewport.tier().is_narrow() {
            config.particle_count = 800;
            config.camera_z = 9.0;
            config.portal_expand_scale = 3.5;
            config.character_y = -2.2;
        }
        config
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the particle bounding radius.
    pub fn with_particle_spread(mut self, spread: f32) -> Self {
        self.particle_spread = spread;
        self
    }

    /// Set the main enter phase length.
    pub fn with_expand_duration(mut self, seconds: f32) -> Self {
        self.expand_duration = seconds;
        self
    }

    /// Set the resting camera distance.
    pub fn with_camera_z(mut self, z: f32) -> Self {
        self.camera_z = z;
        self
    }

    /// Fix the particle RNG seed for reproducible layouts.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the post-processing ranges.
    pub fn with_effects(mut self, effects: EffectConfig) -> Self {
        self.effects = effects;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(DeviceTier::from_width(320), DeviceTier::SmallMobile);
        assert_eq!(DeviceTier::from_width(480), DeviceTier::Mobile);
        assert_eq!(DeviceTier::from_width(767), DeviceTier::Mobile);
        assert_eq!(DeviceTier::from_width(768), DeviceTier::Desktop);
        assert_eq!(DeviceTier::SmallMobile.responsive_scale(), 0.5);
        assert_eq!(DeviceTier::Mobile.responsive_scale(), 0.7);
        assert_eq!(DeviceTier::Desktop.fov_degrees(), 45.0);
        assert_eq!(DeviceTier::Mobile.fov_degrees(), 65.0);
    }

    #[test]
    fn test_narrow_overrides() {
        let config = PortalConfig::for_viewport(Viewport::new(390, 844));
        assert_eq!(config.particle_count, 800);
        assert_eq!(config.camera_z, 9.0);
        assert_eq!(config.portal_expand_scale, 3.5);

        let config = PortalConfig::for_viewport(Viewport::new(1920, 1080));
        assert_eq!(config.particle_count, 2500);
        assert_eq!(config.camera_z, 7.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            PortalConfig::from_json(r#"{ "particle_count": 12, "effects": { "bloom_peak": 4.0 } }"#)
                .unwrap();
        assert_eq!(config.particle_count, 12);
        assert_eq!(config.particle_spread, 18.0);
        assert_eq!(config.effects.bloom_peak, 4.0);
        assert_eq!(config.effects.bloom_base, 0.8);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PortalConfig::default().with_seed(7).with_particle_count(99);
        let back = PortalConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back.seed, Some(7));
        assert_eq!(back.particle_count, 99);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            PortalConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
