//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use void_portal::prelude::*;
use void_portal::{CameraRig, FrameContext, ParticleSimulation, Scene, ShaderUniformBridge};

fn bench_particle_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_step");

    for count in [800u32, 2500, 10_000] {
        group.bench_with_input(BenchmarkId::new("idle", count), &count, |b, &count| {
            let mut sim = ParticleSimulation::from_seed(count, 18.0, 1.2, 42);
            b.iter(|| sim.step_with_progress(black_box(0.0)))
        });

        group.bench_with_input(BenchmarkId::new("entering", count), &count, |b, &count| {
            let mut sim = ParticleSimulation::from_seed(count, 18.0, 1.2, 42);
            b.iter(|| sim.step_with_progress(black_box(0.8)))
        });
    }

    group.finish();
}

fn bench_write_gpu(c: &mut Criterion) {
    let sim = ParticleSimulation::from_seed(2500, 18.0, 1.2, 42);
    let mut out = Vec::with_capacity(sim.len());

    c.bench_function("write_gpu_2500", |b| {
        b.iter(|| {
            sim.write_gpu(&mut out);
            black_box(out.len())
        })
    });
}

fn bench_uniform_push(c: &mut Criterion) {
    let config = PortalConfig::default().with_seed(1);
    let viewport = Viewport::new(1280, 720);
    let scene = Scene::new(&config, viewport);
    let camera = CameraRig::new(&config, viewport);
    let pose = camera.pose();
    let mut bridge = ShaderUniformBridge::new(config.effects.clone());
    let ctx = FrameContext::at(3.0).with_progress(0.5);

    c.bench_function("uniform_push", |b| {
        b.iter(|| black_box(bridge.push(&ctx, &scene, 0.1, &pose).frame()))
    });
}

fn bench_full_frame(c: &mut Criterion) {
    let config = PortalConfig::default().with_seed(1);
    let mut portal = RenderLoop::new(
        config,
        Viewport::new(1280, 720),
        RecordingPipeline::new(),
        UiFlags::default(),
    );
    portal.assets_ready(AssetSet::empty());

    c.bench_function("render_loop_frame", |b| {
        b.iter(|| portal.frame(black_box(1.0 / 60.0)))
    });
}

criterion_group!(
    benches,
    bench_particle_step,
    bench_write_gpu,
    bench_uniform_push,
    bench_full_frame,
);
criterion_main!(benches);
