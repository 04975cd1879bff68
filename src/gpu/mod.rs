//! wgpu render backend.
//!
//! [`WgpuPipeline`] owns the surface and device and implements
//! [`RenderPipeline`]: a base pass draws the scene offscreen, then the post
//! chain runs bloom, grain, chromatic aberration, vignette, hallucination,
//! afterimage and local distortion, the last one straight into the surface.
//!
//! Shader uniform structs are generated from the uniform sets, so the
//! pipelines are built lazily from the first frame's layout.

mod base_pass;
mod post_process;

use std::sync::Arc;

use winit::window::Window;

use crate::assets::AssetSet;
use crate::error::{GpuError, RenderError};
use crate::input::Viewport;
use crate::pipeline::{FrameOutput, RenderPipeline};
use crate::uniforms::FrameUniforms;

use base_pass::{BasePass, SceneTextures};
use post_process::PostChain;

/// Decoded textures kept until the pipelines are built.
struct PendingTextures {
    metal: crate::assets::TextureData,
    noise: crate::assets::TextureData,
    smoke: crate::assets::TextureData,
}

struct Passes {
    base: BasePass,
    post: PostChain,
}

/// Window-backed render pipeline.
pub struct WgpuPipeline {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    textures: PendingTextures,
    particle_capacity: usize,
    passes: Option<Passes>,
}

impl WgpuPipeline {
    /// Set up the surface and device for `window`.
    ///
    /// Missing textures in `assets` are replaced by generated ones.
    pub async fn new(
        window: Arc<Window>,
        assets: &AssetSet,
        particle_capacity: usize,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("gpu: using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            textures: PendingTextures {
                metal: assets.metal_or_fallback(),
                noise: assets.noise_or_fallback(),
                smoke: assets.smoke_or_fallback(),
            },
            particle_capacity,
            passes: None,
        })
    }

    fn build_passes(&self, uniforms: &FrameUniforms) -> Passes {
        log::debug!("gpu: building passes for frame {}", uniforms.frame());
        let textures = SceneTextures {
            metal: &self.textures.metal,
            noise: &self.textures.noise,
            smoke: &self.textures.smoke,
        };
        Passes {
            base: BasePass::new(
                &self.device,
                &self.queue,
                uniforms,
                textures,
                self.config.format,
                self.particle_capacity,
            ),
            post: PostChain::new(
                &self.device,
                uniforms,
                self.config.width,
                self.config.height,
                self.config.format,
            ),
        }
    }

    /// Reconfigure the surface with its current size.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

impl RenderPipeline for WgpuPipeline {
    fn render(&mut self, frame: &FrameOutput<'_>) -> Result<(), RenderError> {
        if self.passes.is_none() {
            self.passes = Some(self.build_passes(frame.uniforms));
        }
        let Some(passes) = self.passes.as_mut() else {
            return Ok(());
        };

        passes
            .base
            .write(&self.device, &self.queue, frame.uniforms, frame.particles);
        passes.post.write_uniforms(&self.queue, frame.uniforms);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        passes.base.encode(&mut encoder, &passes.post.targets[0].view);
        passes.post.encode(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        if let Some(passes) = self.passes.as_mut() {
            passes
                .post
                .resize(&self.device, viewport.width, viewport.height);
        }
    }
}
