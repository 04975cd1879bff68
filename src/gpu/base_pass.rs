//! Scene geometry: smoke planes, the portal torus, the vortex core and the
//! particle field.
//!
//! Everything is additive and transparent, so there is no depth buffer and
//! draw order is only a matter of taste. All four draws share one uniform
//! buffer (the base stage set) and one bind group with the three textures.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;
use wgpu::util::DeviceExt;

use crate::assets::{AddressMode, TextureData};
use crate::particles::ParticleGpu;
use crate::uniforms::{FrameUniforms, Stage};

/// Tube thickness of the portal ring.
pub(crate) const PORTAL_TUBE: f32 = 0.45;
const RADIAL_SEGMENTS: u32 = 128;
const TUBULAR_SEGMENTS: u32 = 256;
/// Background, also the fog color.
const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.004,
    g: 0.004,
    b: 0.008,
    a: 1.0,
};

/// Torus vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct PortalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Torus around the z axis, indexed as a triangle list.
pub(crate) fn torus(
    radius: f32,
    tube: f32,
    radial: u32,
    tubular: u32,
) -> (Vec<PortalVertex>, Vec<u32>) {
    let radial = radial.max(3);
    let tubular = tubular.max(3);
    let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);

    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = glam::Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let centre = glam::Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            vertices.push(PortalVertex {
                position: position.to_array(),
                normal: (position - centre).normalize_or_zero().to_array(),
                uv: [i as f32 / tubular as f32, j as f32 / radial as f32],
            });
        }
    }

    let row = tubular + 1;
    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    (vertices, indices)
}

const SHADER_BODY: &str = r#"
@group(0) @binding(0)
var<uniform> uniforms: Uniforms;
@group(0) @binding(1)
var metal_tex: texture_2d<f32>;
@group(0) @binding(2)
var metal_sampler: sampler;
@group(0) @binding(3)
var noise_tex: texture_2d<f32>;
@group(0) @binding(4)
var noise_sampler: sampler;
@group(0) @binding(5)
var smoke_tex: texture_2d<f32>;
@group(0) @binding(6)
var smoke_sampler: sampler;

const FOG_COLOR: vec3<f32> = vec3<f32>(0.004, 0.004, 0.008);
const FOG_DENSITY: f32 = 0.045;

fn quad_corner(index: u32) -> vec2<f32> {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, -0.5),
        vec2<f32>(0.5, 0.5),
        vec2<f32>(-0.5, 0.5),
    );
    return corners[index];
}

// ACES filmic fit with the frame's exposure
fn tone_map(color: vec3<f32>) -> vec3<f32> {
    let c = max(color, vec3<f32>(0.0)) * uniforms.exposure;
    return clamp((c * (2.51 * c + 0.03)) / (c * (2.43 * c + 0.59) + 0.14), vec3<f32>(0.0), vec3<f32>(1.0));
}

fn fog(color: vec3<f32>, depth: f32) -> vec3<f32> {
    let amount = 1.0 - exp(-FOG_DENSITY * FOG_DENSITY * depth * depth);
    return mix(color, FOG_COLOR, clamp(amount, 0.0, 1.0));
}

struct SmokeOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) opacity: f32,
    @location(2) depth: f32,
};

@vertex
fn vs_smoke(@builtin(vertex_index) vertex_index: u32, @builtin(instance_index) layer_index: u32) -> SmokeOut {
    let corner = quad_corner(vertex_index);
    let angle = uniforms.smoke_rotation[layer_index];
    let c = cos(angle);
    let s = sin(angle);
    let p = vec2<f32>(corner.x * c - corner.y * s, corner.x * s + corner.y * c) * uniforms.smoke_scale[layer_index];

    var out: SmokeOut;
    out.clip_position = uniforms.view_proj * vec4<f32>(p, uniforms.smoke_depth[layer_index], 1.0);
    out.uv = vec2<f32>(corner.x + 0.5, 0.5 - corner.y);
    out.opacity = uniforms.smoke_opacity[layer_index];
    out.depth = out.clip_position.w;
    return out;
}

@fragment
fn fs_smoke(in: SmokeOut) -> @location(0) vec4<f32> {
    let tex = textureSample(smoke_tex, smoke_sampler, in.uv);
    let tint = vec3<f32>(0.29, 0.416, 0.541);
    return vec4<f32>(tone_map(fog(tex.rgb * tint, in.depth)), tex.a * in.opacity);
}

struct PortalIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct PortalOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) world: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) depth: f32,
};

@vertex
fn vs_portal(v: PortalIn) -> PortalOut {
    let metal = textureSampleLevel(metal_tex, metal_sampler, v.uv * 2.0 + vec2<f32>(uniforms.time * 0.05), 0.0).r;
    let mouse_dist = length(v.position.xy - uniforms.mouse * 2.0);
    let mouse_influence = 1.0 - smoothstep(0.0, 3.5, mouse_dist);
    let displacement = metal * 0.04 + mouse_influence * 0.15 * (1.0 + uniforms.interaction);

    var pos = v.position;
    let twist = pos.y * 0.2 * uniforms.interaction;
    let c = cos(twist);
    let s = sin(twist);
    pos = vec3<f32>(c * pos.x + s * pos.z, pos.y, c * pos.z - s * pos.x);

    let world = uniforms.portal_model * vec4<f32>(pos + v.normal * displacement, 1.0);
    var out: PortalOut;
    out.clip_position = uniforms.view_proj * world;
    out.normal = normalize((uniforms.portal_model * vec4<f32>(v.normal, 0.0)).xyz);
    out.world = world.xyz;
    out.uv = v.uv;
    out.depth = out.clip_position.w;
    return out;
}

@fragment
fn fs_portal(in: PortalOut) -> @location(0) vec4<f32> {
    let view_dir = normalize(uniforms.camera_position - in.world);
    let fresnel = pow(1.0 - abs(dot(view_dir, normalize(in.normal))), 2.5);

    let noise_uv = in.uv * 2.0 + vec2<f32>(uniforms.time * 0.03, uniforms.time * 0.05);
    let st = in.uv + vec2<f32>(textureSample(noise_tex, noise_sampler, noise_uv).r * 0.1);
    let roughness = textureSample(metal_tex, metal_sampler, st * 3.0).r;
    let noise_mask = textureSample(noise_tex, noise_sampler, st * 1.5 - vec2<f32>(uniforms.time * 0.08)).g;
    let pulse = sin(uniforms.time * 2.0 + noise_mask * 10.0) * 0.5 + 0.5;

    let base_core = vec3<f32>(0.02, 0.03, 0.05);
    let mid_glow = vec3<f32>(0.08, 0.15, 0.25);
    let hot_edge = vec3<f32>(0.3, 0.5, 0.65);
    var color = mix(base_core, mid_glow, fresnel + pulse * 0.3);
    color = mix(color, hot_edge, fresnel * pulse * noise_mask);
    color = color - vec3<f32>(roughness * 0.05);
    color = color * uniforms.intensity * (1.0 + uniforms.interaction * 2.0);

    let alpha = smoothstep(0.0, 0.8, fresnel + noise_mask * 0.5 + 0.1);
    return vec4<f32>(tone_map(fog(color, in.depth)), alpha);
}

struct CoreOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) depth: f32,
};

@vertex
fn vs_core(@builtin(vertex_index) vertex_index: u32) -> CoreOut {
    let corner = quad_corner(vertex_index);
    let local = vec4<f32>(corner * uniforms.portal_radius * 2.2, -0.5, 1.0);
    var out: CoreOut;
    out.clip_position = uniforms.view_proj * uniforms.portal_model * local;
    out.uv = corner + vec2<f32>(0.5);
    out.depth = out.clip_position.w;
    return out;
}

@fragment
fn fs_core(in: CoreOut) -> @location(0) vec4<f32> {
    let uv = in.uv - vec2<f32>(0.5);
    let radius = length(uv);
    let angle = atan2(uv.y, uv.x);

    let spiral = angle * 2.0 - radius * (20.0 + uniforms.interaction * 10.0) + uniforms.time * 2.0;
    let polar_uv = vec2<f32>(cos(spiral), sin(spiral)) * radius;
    let swirl = textureSample(noise_tex, noise_sampler, polar_uv * 0.5 + vec2<f32>(uniforms.time * 0.05)).r;

    let edge = 1.0 - smoothstep(0.0, 0.5, radius);
    let inner = smoothstep(0.0, 0.15, radius);
    let color = vec3<f32>(0.01, 0.03, 0.08) + vec3<f32>(0.05, 0.1, 0.2) * swirl;
    let alpha = swirl * edge * inner * (0.6 + uniforms.interaction * 0.4);
    return vec4<f32>(tone_map(fog(color * (1.0 + uniforms.interaction), in.depth)), alpha);
}

struct ParticleIn {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) opacity: f32,
};

struct ParticleOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) opacity: f32,
    @location(2) depth: f32,
};

@vertex
fn vs_particle(@builtin(vertex_index) vertex_index: u32, p: ParticleIn) -> ParticleOut {
    var pos = p.position;
    // Depth stretch while the portal opens
    pos.z = pos.z + uniforms.interaction * abs(pos.x + pos.y) * 2.0;

    var clip = uniforms.view_proj * uniforms.particle_model * vec4<f32>(pos, 1.0);
    let corner = quad_corner(vertex_index);
    // 300 px per unit of size at depth 1, shrinking with distance
    let pixels = p.size * 300.0 * (1.0 + uniforms.interaction * 0.5);
    let offset = corner * 2.0 * pixels / uniforms.resolution;
    clip = vec4<f32>(clip.xy + offset, clip.zw);

    var out: ParticleOut;
    out.clip_position = clip;
    out.uv = corner + vec2<f32>(0.5);
    out.opacity = p.opacity;
    out.depth = clip.w;
    return out;
}

@fragment
fn fs_particle(in: ParticleOut) -> @location(0) vec4<f32> {
    let ll = length(in.uv - vec2<f32>(0.5));
    if (ll > 0.5) {
        discard;
    }
    let alpha = (1.0 - smoothstep(0.1, 0.5, ll)) * in.opacity;
    return vec4<f32>(tone_map(fog(vec3<f32>(0.3, 0.45, 0.65), in.depth)), alpha);
}
"#;

/// Full WGSL source of the base pass.
pub(crate) fn generate_shader(uniform_fields: &str) -> String {
    format!("struct Uniforms {{\n{uniform_fields}\n}};\n{SHADER_BODY}")
}

/// Additive blending, as every scene material uses.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

/// Upload decoded pixels. Returns the view and a matching sampler.
fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    data: &TextureData,
    label: &str,
) -> (wgpu::TextureView, wgpu::Sampler) {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &data.data,
    );
    let address_mode = match data.address_mode {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
    };
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });
    (texture.create_view(&wgpu::TextureViewDescriptor::default()), sampler)
}

/// Textures the base pass samples.
pub(crate) struct SceneTextures<'a> {
    pub metal: &'a TextureData,
    pub noise: &'a TextureData,
    pub smoke: &'a TextureData,
}

pub(crate) struct BasePass {
    smoke_pipeline: wgpu::RenderPipeline,
    portal_pipeline: wgpu::RenderPipeline,
    core_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_size: usize,
    bind_group: wgpu::BindGroup,
    torus_vertices: wgpu::Buffer,
    torus_indices: wgpu::Buffer,
    torus_index_count: u32,
    particle_buffer: wgpu::Buffer,
    particle_capacity: usize,
    particle_count: u32,
}

impl BasePass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &FrameUniforms,
        textures: SceneTextures<'_>,
        format: wgpu::TextureFormat,
        particle_capacity: usize,
    ) -> Self {
        let base = uniforms.stage(Stage::Base);
        let uniform_size = base.byte_size().max(16);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Base Uniform Buffer"),
            size: uniform_size as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (metal_view, metal_sampler) =
            upload_texture(device, queue, textures.metal, "Metal Texture");
        let (noise_view, noise_sampler) =
            upload_texture(device, queue, textures.noise, "Noise Texture");
        let (smoke_view, smoke_sampler) =
            upload_texture(device, queue, textures.smoke, "Smoke Texture");

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Base Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
                texture_entry(3),
                sampler_entry(4),
                texture_entry(5),
                sampler_entry(6),
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Base Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&metal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&metal_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&noise_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&smoke_view),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(&smoke_sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Base Shader"),
            source: wgpu::ShaderSource::Wgsl(generate_shader(&base.to_wgsl_fields()).into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Base Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline =
            |label: &str, vs: &str, fs: &str, buffers: &[wgpu::VertexBufferLayout]| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some(vs),
                        buffers,
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(fs),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(ADDITIVE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            };

        let portal_attributes =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        let particle_attributes =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32];

        let smoke_pipeline = make_pipeline("Smoke Pipeline", "vs_smoke", "fs_smoke", &[]);
        let core_pipeline = make_pipeline("Core Pipeline", "vs_core", "fs_core", &[]);
        let portal_pipeline = make_pipeline(
            "Portal Pipeline",
            "vs_portal",
            "fs_portal",
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PortalVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &portal_attributes,
            }],
        );
        let particle_pipeline = make_pipeline(
            "Particle Pipeline",
            "vs_particle",
            "fs_particle",
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ParticleGpu>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &particle_attributes,
            }],
        );

        let torus_radius = base.f32("portal_radius").unwrap_or(2.5);
        let (vertices, indices) =
            torus(torus_radius, PORTAL_TUBE, RADIAL_SEGMENTS, TUBULAR_SEGMENTS);
        let torus_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Portal Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let torus_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Portal Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let particle_capacity = particle_capacity.max(1);
        Self {
            smoke_pipeline,
            portal_pipeline,
            core_pipeline,
            particle_pipeline,
            uniform_buffer,
            uniform_size,
            bind_group,
            torus_vertices,
            torus_indices,
            torus_index_count: indices.len() as u32,
            particle_buffer: particle_buffer(device, particle_capacity),
            particle_capacity,
            particle_count: 0,
        }
    }

    /// Upload this frame's base uniforms and particle instances.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniforms: &FrameUniforms,
        particles: &[ParticleGpu],
    ) {
        let mut bytes = uniforms.stage(Stage::Base).to_bytes();
        bytes.resize(self.uniform_size, 0);
        queue.write_buffer(&self.uniform_buffer, 0, &bytes);

        if particles.len() > self.particle_capacity {
            self.particle_capacity = particles.len();
            self.particle_buffer = particle_buffer(device, self.particle_capacity);
        }
        if !particles.is_empty() {
            queue.write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(particles));
        }
        self.particle_count = particles.len() as u32;
    }

    /// Draw the scene into `target`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Base Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_bind_group(0, &self.bind_group, &[]);

        render_pass.set_pipeline(&self.smoke_pipeline);
        render_pass.draw(0..6, 0..3);

        render_pass.set_pipeline(&self.core_pipeline);
        render_pass.draw(0..6, 0..1);

        render_pass.set_pipeline(&self.portal_pipeline);
        render_pass.set_vertex_buffer(0, self.torus_vertices.slice(..));
        render_pass.set_index_buffer(self.torus_indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.torus_index_count, 0, 0..1);

        if self.particle_count > 0 {
            render_pass.set_pipeline(&self.particle_pipeline);
            render_pass.set_vertex_buffer(0, self.particle_buffer.slice(..));
            render_pass.draw(0..6, 0..self.particle_count);
        }
    }
}

fn particle_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Particle Buffer"),
        size: (capacity * std::mem::size_of::<ParticleGpu>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}
