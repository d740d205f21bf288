use super::*;
use crate::constants::{PATCH_SIZE, SHORE_VARIANCE_MIN};
use crate::heightfield::{ConstHeightSource, GridHeightSource, HeightSource, WaveHeightSource};
use crate::patch::Patch;

fn patch_from<H: HeightSource>(source: &H) -> Patch {
  let mut patch = Patch::new(0, 0, 8.0);
  let rect = patch.grid_rect();
  patch.update_heights(source, rect);
  patch
}

/// Stored variance is never zero, even for a perfectly flat tile: the
/// floor guarantees tessellation terminates via the LOD threshold instead
/// of zero-variance checks.
#[test]
fn test_flat_tile_stores_positive_floor_everywhere() {
  let mut patch = patch_from(&ConstHeightSource::new(5.0));
  patch.compute_variance();

  for half in Half::BOTH {
    let field = &patch.variance[half.index()];
    for node in 1..VARIANCE_NODES {
      assert_eq!(
        field.get(node),
        VARIANCE_MIN,
        "flat tile must store exactly the floor at node {node}"
      );
    }
  }
}

/// Upward max-propagation: an internal node's stored error is at least as
/// large as either child's, so the driver can prune a subtree on one
/// comparison.
#[test]
fn test_variance_is_monotonic_towards_the_root() {
  let mut patch = patch_from(&WaveHeightSource::new(80.0, 0.11));
  patch.compute_variance();

  for half in Half::BOTH {
    let field = &patch.variance[half.index()];
    for node in 1..VARIANCE_NODES / 2 {
      let parent = field.get(node);
      assert!(
        parent >= field.get(node * 2),
        "node {node} smaller than left child"
      );
      assert!(
        parent >= field.get(node * 2 + 1),
        "node {node} smaller than right child"
      );
    }
  }
}

/// Triangles whose heights straddle the zero shoreline get amplified
/// variance. A zero-curvature ramp crossing zero stores exactly the
/// amplification floor at the root: every raw error is zero, only the
/// shoreline rule contributes.
#[test]
fn test_shoreline_amplification() {
  let verts = PATCH_SIZE + 1;
  let samples = (0..verts * verts)
    .map(|i| (i % verts) as f32 - 64.0)
    .collect();
  let ramp = GridHeightSource::new(verts, verts, samples);

  let mut patch = patch_from(&ramp);
  patch.compute_variance();

  for half in Half::BOTH {
    assert_eq!(patch.variance[half.index()].get(1), SHORE_VARIANCE_MIN);
  }
}

/// Terrain that dips below the waterline somewhere always reports at least
/// the shoreline floor at the root, via max-propagation.
#[test]
fn test_shoreline_reaches_root_through_propagation() {
  let mut patch = patch_from(&WaveHeightSource::new(30.0, 0.07));
  patch.compute_variance();

  for half in Half::BOTH {
    assert!(patch.variance[half.index()].get(1) >= SHORE_VARIANCE_MIN);
  }
}

/// Recomputing on identical heights reproduces identical values.
#[test]
fn test_variance_is_deterministic() {
  let mut patch = patch_from(&WaveHeightSource::default());
  patch.compute_variance();
  let before: Vec<f32> = (1..VARIANCE_NODES)
    .map(|n| patch.variance[0].get(n))
    .collect();

  patch.compute_variance();
  let after: Vec<f32> = (1..VARIANCE_NODES)
    .map(|n| patch.variance[0].get(n))
    .collect();

  assert_eq!(before, after);
}
