//! Pass scheduler: runs one tessellation pass over a terrain on the rayon
//! worker pool.
//!
//! `Split` mutates neighbor state reachable from a patch's root triangles,
//! so two patches that are adjacent, or that share a common neighbor,
//! must never be tessellated concurrently. Rather than leaving that as
//! caller discipline, the scheduler partitions visible patches into 3×3
//! color classes by tile coordinate and processes the classes sequentially:
//! two patches of one class differ by at least three tiles on some axis, so
//! they are never adjacent and never share a neighbor. Within a class,
//! patches run in parallel and each worker allocates from its own per-pass
//! pool.
//!
//! Pool resets (and any adaptive resizing) happen at the start of the pass,
//! never concurrently with in-flight splits.

use crossbeam_channel as channel;
use rayon::prelude::*;
use web_time::Instant;

use crate::terrain::Terrain;
use crate::tritree::PoolManager;
use crate::types::{Camera, PassStats, PatchOutcome, RenderPass};

/// Number of color classes; tiles of one class are ≥ 3 apart on an axis.
const COLOR_CLASSES: usize = 9;

/// Tessellate every patch visible in `pass` at `frame` and regenerate its
/// index and border-skirt buffers. Dirty patches get their variance
/// recomputed first. Runs to completion synchronously; pool exhaustion
/// degrades detail for the affected patches and grows the pools for the
/// next pass.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "terrain::tessellate_pass"))]
pub fn tessellate_pass(
  terrain: &mut Terrain,
  pools: &mut PoolManager,
  camera: &Camera,
  pass: RenderPass,
  frame: u64,
) -> PassStats {
  let start = Instant::now();

  // between-pass maintenance: rewind pools, grow them if the previous pass
  // ran dry
  pools.reset_all(pass);

  // variance is per-patch state with no cross-patch reach, so dirty
  // patches recompute without the coloring constraint
  let variance_recomputed = terrain
    .patches_mut()
    .par_iter_mut()
    .filter(|p| p.is_dirty())
    .map(|p| p.compute_variance())
    .count();

  let patches_x = terrain.patches_x();
  let pools: &PoolManager = pools;
  let (tx, rx) = channel::unbounded::<PatchOutcome>();

  for color in 0..COLOR_CLASSES {
    terrain
      .patches_mut()
      .par_iter_mut()
      .enumerate()
      .filter(|(i, patch)| {
        color_class(*i, patches_x) == color && patch.is_visible(pass, frame)
      })
      .for_each_with(tx.clone(), |tx, (_, patch)| {
        let mut pool = pools.worker_pool(pass).lock().unwrap();

        patch.reset();
        let complete = patch.tessellate(&mut pool, camera);
        patch.generate_indices(&pool);
        patch.generate_border_vertices(&pool);

        let _ = tx.send(PatchOutcome {
          triangles: patch.triangle_count(),
          complete,
        });
      });
  }
  drop(tx);

  let mut stats = PassStats {
    variance_recomputed,
    ..PassStats::default()
  };
  for outcome in rx.try_iter() {
    stats.patches += 1;
    stats.triangles += outcome.triangles;
    if !outcome.complete {
      stats.exhausted_patches += 1;
    }
  }
  stats.duration_us = start.elapsed().as_micros() as u64;

  stats
}

/// Color class of the patch at linear index `i` in a `patches_x`-wide grid.
#[inline]
fn color_class(i: usize, patches_x: usize) -> usize {
  let x = i % patches_x;
  let y = i / patches_x;
  (x % 3) + 3 * (y % 3)
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
