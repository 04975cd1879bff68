//! Drifting dust around the portal.
//!
//! A fixed-size particle field, created once and stepped on the CPU every
//! frame. Particles are never spawned or killed: when one drifts past the
//! bounding sphere its velocity is reversed and it is put back on the
//! sphere, so the field keeps its density forever.
//!
//! Dynamics are deliberately simple and per-frame (not scaled by delta
//! time), matching the look the rest of the scene was tuned against:
//!
//! - `speed = 1 + 6 * progress`
//! - `position += velocity * speed`
//! - away from the axis, a tangential swirl of `0.001 * speed` is added
//! - the whole group spins about z by `0.0003 * speed`

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::PortalConfig;
use crate::context::FrameContext;

/// Extra speed at full progress (`speed = 1 + progress * SPEED_GAIN`).
pub const SPEED_GAIN: f32 = 6.0;
/// Distance from the z axis below which no swirl is applied.
pub const SWIRL_THRESHOLD: f32 = 0.5;
/// Tangential swirl per frame at rest speed.
pub const SWIRL_STRENGTH: f32 = 0.001;
/// Group spin per frame at rest speed, in radians.
pub const GROUP_SPIN: f32 = 0.0003;
/// Largest velocity component at creation.
pub const MAX_DRIFT: f32 = 0.0005;

/// One particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Displacement per frame at rest speed.
    pub velocity: Vec3,
    pub size: f32,
    pub opacity: f32,
}

/// GPU layout of a particle, one instance per particle.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ParticleGpu {
    pub position: [f32; 3],
    pub size: f32,
    pub opacity: f32,
    pub _pad: [f32; 3],
}

impl From<&Particle> for ParticleGpu {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
            opacity: p.opacity,
            _pad: [0.0; 3],
        }
    }
}

/// Speed multiplier for a given transition progress.
#[inline]
pub fn speed_scale(progress: f32) -> f32 {
    1.0 + progress.clamp(0.0, 1.0) * SPEED_GAIN
}

/// The particle field.
#[derive(Debug, Clone)]
pub struct ParticleSimulation {
    particles: Vec<Particle>,
    spread: f32,
    spin: f32,
}

impl ParticleSimulation {
    /// Field sized and seeded from the config.
    ///
    /// Without a configured seed the layout differs on every run.
    pub fn new(config: &PortalConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        Self::from_seed(
            config.particle_count,
            config.particle_spread,
            config.particle_size,
            seed,
        )
    }

    /// Reproducible field.
    pub fn from_seed(count: u32, spread: f32, size: f32, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::with_rng(count, spread, size, &mut rng)
    }

    /// Field drawn from the given RNG.
    ///
    /// Depth is biased towards the back of the scene; the disc radius
    /// narrows with depth and particles crowd towards the axis.
    pub fn with_rng<R: Rng>(count: u32, spread: f32, size: f32, rng: &mut R) -> Self {
        let spread = spread.max(0.0);
        let particles = (0..count)
            .map(|_| {
                let z = (rng.gen::<f32>() - 0.2) * spread;
                let xy_spread = (spread - z.abs()) * 0.8;
                let theta = rng.gen_range(0.0..TAU);
                let radius = rng.gen::<f32>().powf(0.7) * xy_spread;

                let mut drift = || (rng.gen::<f32>() - 0.5) * 2.0 * MAX_DRIFT;
                let velocity = Vec3::new(drift(), drift(), drift());

                Particle {
                    position: Vec3::new(radius * theta.cos(), radius * theta.sin(), z),
                    velocity,
                    size: rng.gen::<f32>() * size + 0.3,
                    opacity: rng.gen::<f32>() * 0.6 + 0.1,
                }
            })
            .collect();

        Self {
            particles,
            spread,
            spin: 0.0,
        }
    }

    /// Advance one frame at the context's progress.
    pub fn step(&mut self, ctx: &FrameContext) {
        self.step_with_progress(ctx.progress);
    }

    /// Advance one frame at the given progress.
    pub fn step_with_progress(&mut self, progress: f32) {
        let speed = speed_scale(progress);
        let spread = self.spread;

        for p in &mut self.particles {
            p.position += p.velocity * speed;

            let axial = p.position.truncate().length();
            if axial > SWIRL_THRESHOLD {
                let tangent = Vec3::new(-p.position.y, p.position.x, 0.0) / axial;
                p.position += tangent * SWIRL_STRENGTH * speed;
            }

            let distance = p.position.length();
            if distance > spread {
                p.velocity = -p.velocity;
                p.position *= spread / distance;
            }
        }

        self.spin = (self.spin + GROUP_SPIN * speed) % TAU;
    }

    /// Group rotation about z, in radians.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Bounding sphere radius.
    pub fn spread(&self) -> f32 {
        self.spread
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Write the GPU layout of every particle into `out`, reusing its allocation.
    pub fn write_gpu(&self, out: &mut Vec<ParticleGpu>) {
        out.clear();
        out.extend(self.particles.iter().map(ParticleGpu::from));
    }

    /// GPU layout of every particle.
    pub fn to_gpu(&self) -> Vec<ParticleGpu> {
        let mut out = Vec::with_capacity(self.particles.len());
        self.write_gpu(&mut out);
        out
    }
}
