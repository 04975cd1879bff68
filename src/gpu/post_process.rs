//! Post-processing chain.
//!
//! The base pass renders into an offscreen texture. Each post stage is a
//! fullscreen pass that samples the previous result and writes the next,
//! ping-ponging between two offscreen targets. The last stage writes to the
//! surface.
//!
//! Every stage shares one shader skeleton: the uniform struct is generated
//! from the stage's [`UniformSet`](crate::uniforms::UniformSet), the fragment
//! body is stage specific.
//! Binding 3 is the afterimage history, a copy of the afterimage output from
//! the previous frame; stages other than afterimage ignore it.

use crate::uniforms::{FrameUniforms, Stage};

/// Fragment body of a post stage.
pub(crate) fn fragment_body(stage: Stage) -> &'static str {
    match stage {
        Stage::Base => "    return textureSample(source, source_sampler, in.uv);",
        Stage::Bloom => BLOOM,
        Stage::Grain => GRAIN,
        Stage::ChromaticAberration => CHROMATIC,
        Stage::Vignette => VIGNETTE,
        Stage::Hallucination => HALLUCINATION,
        Stage::Afterimage => AFTERIMAGE,
        Stage::LocalDistortion => LOCAL_DISTORTION,
    }
}

const BLOOM: &str = r#"
    let texel = 1.0 / vec2<f32>(textureDimensions(source));
    let base = textureSample(source, source_sampler, in.uv);
    let spread = 1.0 + params.radius * 4.0;
    var glow = vec3<f32>(0.0);
    for (var x = -2; x <= 2; x = x + 1) {
        for (var y = -2; y <= 2; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * texel * spread;
            let c = textureSampleLevel(source, source_sampler, in.uv + offset, 0.0).rgb;
            let luma = dot(c, vec3<f32>(0.2126, 0.7152, 0.0722));
            glow = glow + c * smoothstep(params.threshold, params.threshold + 0.1, luma);
        }
    }
    return vec4<f32>(base.rgb + glow / 25.0 * params.strength, base.a);
"#;

const GRAIN: &str = r#"
    let c = textureSample(source, source_sampler, in.uv);
    let seed = in.uv * 1000.0 + vec2<f32>(params.time);
    let n = fract(sin(dot(seed, vec2<f32>(12.9898, 78.233))) * 43758.5453);
    return vec4<f32>(c.rgb + c.rgb * (n - 0.5) * params.intensity, c.a);
"#;

const CHROMATIC: &str = r#"
    let shift = vec2<f32>(params.amount, 0.0);
    let r = textureSample(source, source_sampler, in.uv + shift).r;
    let g = textureSample(source, source_sampler, in.uv);
    let b = textureSample(source, source_sampler, in.uv - shift).b;
    return vec4<f32>(r, g.g, b, g.a);
"#;

const VIGNETTE: &str = r#"
    let texel = textureSample(source, source_sampler, in.uv);
    let uv = (in.uv - vec2<f32>(0.5)) * vec2<f32>(params.offset);
    return vec4<f32>(mix(texel.rgb, vec3<f32>(0.0), dot(uv, uv) * params.darkness), texel.a);
"#;

const HALLUCINATION: &str = r#"
    var uv = in.uv;
    let to_centre = uv - vec2<f32>(0.5);
    let dist = length(to_centre);

    let breathing = sin(params.time * 1.2) * 0.002 * params.intensity;
    uv = uv + to_centre * breathing;

    let edge = smoothstep(0.0, 0.5, dist);
    let n = value_noise(uv * 10.0 + vec2<f32>(params.time * 0.5));
    uv = uv + vec2<f32>((n - 0.5) * 0.012 * params.intensity * edge);

    return textureSample(source, source_sampler, uv);
"#;

const AFTERIMAGE: &str = r#"
    let current = textureSample(source, source_sampler, in.uv);
    var previous = textureSample(history, source_sampler, in.uv);
    previous = previous * params.damp * step(vec4<f32>(0.1), previous);
    return max(current, previous);
"#;

const LOCAL_DISTORTION: &str = r#"
    var uv = in.uv;
    let d = distance(uv, params.char_pos);
    let mask = 1.0 - smoothstep(0.0, 0.3, d);
    let wave = sin(uv.x * 50.0 + params.time * 10.0) * cos(uv.y * 50.0 + params.time * 10.0);
    uv = uv + vec2<f32>(wave * 0.005 * params.intensity * mask);
    let c = textureSample(source, source_sampler, uv);
    return vec4<f32>(mix(c.rgb, vec3<f32>(1.0), params.flash), 1.0);
"#;

/// Full WGSL source of a post stage.
pub(crate) fn generate_shader(body: &str, uniform_fields: &str) -> String {
    format!(
        r#"
struct Params {{
{uniform_fields}
}};

struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}};

@group(0) @binding(0)
var source: texture_2d<f32>;
@group(0) @binding(1)
var source_sampler: sampler;
@group(0) @binding(2)
var<uniform> params: Params;
@group(0) @binding(3)
var history: texture_2d<f32>;

fn hash(p: vec2<f32>) -> f32 {{
    return fract(sin(dot(p, vec2<f32>(12.7, 311.1))) * 43758.5);
}}

fn value_noise(p: vec2<f32>) -> f32 {{
    let i = floor(p);
    let f = fract(p);
    let a = hash(i);
    let b = hash(i + vec2<f32>(1.0, 0.0));
    let c = hash(i + vec2<f32>(0.0, 1.0));
    let d = hash(i + vec2<f32>(1.0, 1.0));
    let u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {{
    var positions = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var uvs = array<vec2<f32>, 3>(
        vec2<f32>(0.0, 1.0),
        vec2<f32>(2.0, 1.0),
        vec2<f32>(0.0, -1.0),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(positions[vertex_index], 0.0, 1.0);
    out.uv = uvs[vertex_index];
    return out;
}}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {{
{body}
}}
"#
    )
}

/// Offscreen color target.
pub(crate) struct Target {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// One fullscreen stage.
struct PostPass {
    stage: Stage,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_size: usize,
    /// Reads `targets[input]`.
    bind_group: wgpu::BindGroup,
    input: usize,
}

/// Every post stage plus the ping-pong targets and afterimage history.
pub(crate) struct PostChain {
    passes: Vec<PostPass>,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Base pass renders into `targets[0]`.
    pub targets: [Target; 2],
    history: Target,
    format: wgpu::TextureFormat,
}

impl PostChain {
    /// Build every post stage from this frame's uniform layout.
    pub fn new(
        device: &wgpu::Device,
        uniforms: &FrameUniforms,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let targets = [
            Target::new(device, "Post Target A", width, height, format),
            Target::new(device, "Post Target B", width, height, format),
        ];
        let history = Target::new(device, "Afterimage History", width, height, format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Post Bind Group Layout"),
            entries: &[
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(3),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Post Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mut chain = Self {
            passes: Vec::with_capacity(Stage::POST.len()),
            bind_group_layout,
            sampler,
            targets,
            history,
            format,
        };

        for (i, stage) in Stage::POST.into_iter().enumerate() {
            let set = uniforms.stage(stage);
            let shader_src = generate_shader(fragment_body(stage), &set.to_wgsl_fields());
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(stage.label()),
                source: wgpu::ShaderSource::Wgsl(shader_src.into()),
            });
            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(stage.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

            let uniform_size = set.byte_size().max(16);
            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(stage.label()),
                size: uniform_size as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let input = i % 2;
            let bind_group = chain.bind_group(device, &uniform_buffer, input);
            chain.passes.push(PostPass {
                stage,
                pipeline,
                uniform_buffer,
                uniform_size,
                bind_group,
                input,
            });
        }
        chain
    }

    fn bind_group(
        &self,
        device: &wgpu::Device,
        uniforms: &wgpu::Buffer,
        input: usize,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Post Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.targets[input].view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&self.history.view),
                },
            ],
        })
    }

    /// Recreate targets and bind groups after a resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = [
            Target::new(device, "Post Target A", width, height, self.format),
            Target::new(device, "Post Target B", width, height, self.format),
        ];
        self.history = Target::new(device, "Afterimage History", width, height, self.format);
        let groups: Vec<_> = self
            .passes
            .iter()
            .map(|pass| self.bind_group(device, &pass.uniform_buffer, pass.input))
            .collect();
        for (pass, group) in self.passes.iter_mut().zip(groups) {
            pass.bind_group = group;
        }
    }

    /// Upload this frame's post uniforms.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        for pass in &self.passes {
            let mut bytes = uniforms.stage(pass.stage).to_bytes();
            bytes.resize(pass.uniform_size, 0);
            queue.write_buffer(&pass.uniform_buffer, 0, &bytes);
        }
    }

    /// Encode every stage. The last one draws into `surface`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, surface: &wgpu::TextureView) {
        let last = self.passes.len().saturating_sub(1);
        for (i, pass) in self.passes.iter().enumerate() {
            let output = if i == last {
                surface
            } else {
                &self.targets[1 - pass.input].view
            };
            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(pass.stage.label()),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: output,
                        resolve_target: None,
                        depth_slice: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                render_pass.set_pipeline(&pass.pipeline);
                render_pass.set_bind_group(0, &pass.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            if pass.stage == Stage::Afterimage && i != last {
                encoder.copy_texture_to_texture(
                    self.targets[1 - pass.input].texture.as_image_copy(),
                    self.history.texture.as_image_copy(),
                    self.history.texture.size(),
                );
            }
        }
    }
}
