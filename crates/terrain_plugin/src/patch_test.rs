use glam::{ivec2, Vec3};

use super::*;
use crate::heightfield::{ConstHeightSource, WaveHeightSource};
use crate::types::Camera;

fn patch_from<H: HeightSource>(source: &H) -> Patch {
  let mut patch = Patch::new(0, 0, 8.0);
  let rect = patch.grid_rect();
  patch.update_heights(source, rect);
  patch
}

/// New patches start as two mutually-linked root leaves.
#[test]
fn test_new_patch_roots_are_linked_leaves() {
  let patch = Patch::new(0, 0, 8.0);

  let left = &patch.roots[Half::Left.index()];
  let right = &patch.roots[Half::Right.index()];

  assert!(left.is_leaf());
  assert!(right.is_leaf());
  assert_eq!(left.base_neighbor(), Some(NodeRef::Root(Half::Right)));
  assert_eq!(right.base_neighbor(), Some(NodeRef::Root(Half::Left)));
}

/// An un-split patch yields exactly two triangles with corners in
/// apex-left-right order.
#[test]
fn test_unsplit_patch_yields_two_triangles() {
  let pool = TriNodePool::with_capacity(16).unwrap();
  let mut patch = patch_from(&ConstHeightSource::new(0.0));

  patch.generate_indices(&pool);

  let s = PATCH_SIZE as u32;
  let verts = s + 1;
  assert_eq!(patch.triangle_count(), 2);
  assert_eq!(
    patch.indices(),
    &[
      // left half: apex (0,0), left (0,S), right (S,0)
      0,
      s * verts,
      s,
      // right half: apex (S,S), left (S,0), right (0,S)
      s * verts + s,
      s,
      s * verts,
    ]
  );
}

/// Height updates mark the patch dirty; variance computation clears it.
#[test]
fn test_dirty_flag_lifecycle() {
  let mut patch = patch_from(&WaveHeightSource::default());
  assert!(patch.is_dirty());

  patch.compute_variance();
  assert!(!patch.is_dirty());

  let touched = patch.update_heights(
    &ConstHeightSource::new(1.0),
    GridRect::new(ivec2(3, 3), ivec2(5, 5)),
  );
  assert!(touched);
  assert!(patch.is_dirty());

  // a region elsewhere on the map does not touch this patch
  let mut clean = patch_from(&ConstHeightSource::new(0.0));
  clean.compute_variance();
  let touched = clean.update_heights(
    &ConstHeightSource::new(1.0),
    GridRect::new(ivec2(500, 500), ivec2(600, 600)),
  );
  assert!(!touched);
  assert!(!clean.is_dirty());
}

/// Visibility compares the stored frame against the current one, per pass.
#[test]
fn test_visibility_frames_per_pass() {
  let mut patch = Patch::new(0, 0, 8.0);

  assert!(!patch.is_visible(RenderPass::Normal, 1));

  patch.mark_visible(RenderPass::Normal, 5);
  assert!(patch.is_visible(RenderPass::Normal, 5));
  assert!(patch.is_visible(RenderPass::Normal, 4));
  assert!(!patch.is_visible(RenderPass::Normal, 6));

  // passes are independent
  assert!(!patch.is_visible(RenderPass::Shadow, 5));
}

/// Bounds track the observed height extremes and the patch's world
/// footprint.
#[test]
fn test_bounds_follow_heights() {
  let square = 8.0;
  let mut patch = Patch::new(1, 2, square);
  let rect = patch.grid_rect();
  patch.update_heights(&ConstHeightSource::new(42.0), rect);

  let (min, max) = patch.bounds();
  let extent = PATCH_SIZE as f32 * square;

  assert_eq!(min, Vec3::new(extent, 42.0, 2.0 * extent));
  assert_eq!(max, Vec3::new(2.0 * extent, 42.0, 3.0 * extent));
}

/// Repeated tessellate + reset cycles with identical camera parameters and
/// unchanged heights reproduce an identical index list.
#[test]
fn test_retessellation_is_deterministic() {
  let mut pool = TriNodePool::with_capacity(1 << 16).unwrap();
  let mut patch = patch_from(&WaveHeightSource::default());
  patch.compute_variance();

  let camera = Camera::new(Vec3::new(300.0, 120.0, 500.0), 600.0);

  patch.tessellate(&mut pool, &camera);
  patch.generate_indices(&pool);
  let first = patch.indices().to_vec();
  assert!(patch.triangle_count() > 2);

  for _ in 0..3 {
    pool.reset();
    patch.reset();
    patch.tessellate(&mut pool, &camera);
    patch.generate_indices(&pool);
    assert_eq!(patch.indices(), first.as_slice());
  }
}
