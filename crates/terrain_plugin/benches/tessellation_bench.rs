//! Tessellation benchmarks.
//!
//! Measures the three per-frame costs in isolation and combined:
//! - **variance**: curvature-error precomputation for one patch
//! - **tessellate**: LOD-driven split of one patch at several distances
//! - **full_pass**: scheduler pass over a small terrain, including index
//!   and skirt extraction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use terrain_plugin::{
  tessellate_pass, Camera, HeightSource, Patch, PoolManager, RenderPass, Terrain, TerrainConfig,
  TriNodePool, WaveHeightSource,
};

fn bench_source() -> WaveHeightSource {
  WaveHeightSource::new(80.0, 0.07)
}

fn ready_patch<H: HeightSource>(source: &H) -> Patch {
  let mut patch = Patch::new(0, 0, 8.0);
  let rect = patch.grid_rect();
  patch.update_heights(source, rect);
  patch.compute_variance();
  patch
}

fn bench_variance(c: &mut Criterion) {
  let source = bench_source();
  let mut patch = ready_patch(&source);

  c.bench_function("variance/one_patch", |b| {
    b.iter(|| {
      patch.compute_variance();
      black_box(&patch);
    })
  });
}

fn bench_tessellate(c: &mut Criterion) {
  let source = bench_source();
  let mut patch = ready_patch(&source);
  let mut pool = TriNodePool::with_capacity(1 << 17).unwrap();

  let mid = {
    let (min, max) = patch.bounds();
    (min + max) * 0.5
  };

  let mut group = c.benchmark_group("tessellate");
  for distance in [0.0f32, 2_000.0, 20_000.0] {
    group.bench_with_input(
      BenchmarkId::from_parameter(distance as u32),
      &distance,
      |b, &distance| {
        let camera = Camera::new(mid + Vec3::new(0.0, 100.0, distance), 1_000.0);
        b.iter(|| {
          pool.reset();
          patch.reset();
          let complete = patch.tessellate(&mut pool, &camera);
          patch.generate_indices(&pool);
          black_box(complete);
        })
      },
    );
  }
  group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
  let source = bench_source();
  let mut terrain = Terrain::new(TerrainConfig::default(), 4, 4, &source);
  let mut pools = PoolManager::new(1 << 20).unwrap();

  let (min, max) = terrain.patches()[5].bounds();
  let camera = Camera::new((min + max) * 0.5 + Vec3::new(0.0, 500.0, 0.0), 900.0);

  let mut frame = 0u64;
  c.bench_function("full_pass/4x4", |b| {
    b.iter(|| {
      frame += 1;
      terrain.update_visibility(RenderPass::Normal, frame, |_min, _max| true);
      let stats = tessellate_pass(&mut terrain, &mut pools, &camera, RenderPass::Normal, frame);
      black_box(stats);
    })
  });
}

criterion_group!(benches, bench_variance, bench_tessellate, bench_full_pass);
criterion_main!(benches);
