use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use scene_lab::geometry::Geometry;
use scene_lab::renderer::{draw_order, lights_uniform};
use scene_lab::scenes::{create_scene, MaterialChoice, SceneKind};

/// Benchmark: mesh generation at the segment counts the scenes use
fn bench_geometry_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_generation");

    group.bench_function("cuboid", |b| {
        b.iter(|| Geometry::cuboid(black_box(1.0), 1.0, 1.0))
    });

    for segments in [16u32, 64, 128] {
        group.bench_with_input(BenchmarkId::new("sphere", segments), &segments, |b, &s| {
            b.iter(|| Geometry::sphere(black_box(0.5), s, s))
        });
        group.bench_with_input(BenchmarkId::new("torus", segments), &segments, |b, &s| {
            b.iter(|| Geometry::torus(black_box(0.35), 0.2, s / 2, s))
        });
    }

    group.finish();
}

/// Benchmark: edge extraction for wireframe rendering
fn bench_wireframe_indices(c: &mut Criterion) {
    let torus = Geometry::torus(0.35, 0.2, 64, 128);
    c.bench_function("wireframe_indices_torus", |b| {
        b.iter(|| black_box(&torus).wireframe_indices())
    });
}

/// Benchmark: the per-frame CPU work before any GPU call
fn bench_frame_preparation(c: &mut Criterion) {
    let setup = create_scene(SceneKind::Materials, MaterialChoice::Standard, 4.0 / 3.0);
    let view = setup.camera.view_matrix();

    c.bench_function("draw_order_materials_scene", |b| {
        b.iter(|| draw_order(black_box(&setup.scene), view))
    });
    c.bench_function("lights_uniform_materials_scene", |b| {
        b.iter(|| lights_uniform(black_box(&setup.scene)))
    });
}

criterion_group!(
    benches,
    bench_geometry_generation,
    bench_wireframe_indices,
    bench_frame_preparation
);
criterion_main!(benches);
