use glam::Vec3;

use super::*;
use crate::heightfield::{ConstHeightSource, HeightSource, WaveHeightSource};
use crate::tritree::relink_mismatch_count;

fn variance_ready_patch<H: HeightSource>(source: &H) -> Patch {
  let mut patch = Patch::new(0, 0, 8.0);
  let rect = patch.grid_rect();
  patch.update_heights(source, rect);
  patch.compute_variance();
  patch
}

/// Point-blank camera with a huge view radius: even a perfectly flat tile
/// refines down to the 1-unit-hypotenuse floor, the maximum leaf count for
/// the tile size.
#[test]
fn test_flat_tile_point_blank_reaches_unit_floor() {
  let mut pool = TriNodePool::with_capacity(1 << 17).unwrap();
  let mut patch = variance_ready_patch(&ConstHeightSource::new(10.0));

  let camera = Camera::new(patch.world_mid(), 1.0e6);
  let complete = patch.tessellate(&mut pool, &camera);
  assert!(complete, "pool sized for a full tree must not run dry");

  patch.generate_indices(&pool);
  let max_leaves = 2 * PATCH_SIZE * PATCH_SIZE;
  assert_eq!(patch.triangle_count(), max_leaves);
  assert_eq!(relink_mismatch_count(), 0);
}

/// A very distant camera performs zero splits.
#[test]
fn test_distant_camera_performs_zero_splits() {
  let mut pool = TriNodePool::with_capacity(1 << 12).unwrap();
  let mut patch = variance_ready_patch(&ConstHeightSource::new(10.0));

  let camera = Camera::new(Vec3::new(1.0e7, 0.0, 1.0e7), 300.0);
  assert!(patch.tessellate(&mut pool, &camera));
  assert_eq!(pool.used(), 0);

  patch.generate_indices(&pool);
  assert_eq!(patch.triangle_count(), 2);
}

/// A tiny view radius has the same effect as distance.
#[test]
fn test_tiny_view_radius_performs_zero_splits() {
  let mut pool = TriNodePool::with_capacity(1 << 12).unwrap();
  let mut patch = variance_ready_patch(&WaveHeightSource::default());

  let camera = Camera::new(Vec3::new(4096.0, 0.0, 4096.0), 1.0);
  assert!(patch.tessellate(&mut pool, &camera));
  assert_eq!(pool.used(), 0);
}

/// Rough terrain tessellates denser near the camera than far from it.
#[test]
fn test_detail_falls_off_with_distance() {
  let source = WaveHeightSource::new(60.0, 0.08);

  let mut near_pool = TriNodePool::with_capacity(1 << 17).unwrap();
  let mut near = variance_ready_patch(&source);
  let near_cam = Camera::new(near.world_mid(), 600.0);
  near.tessellate(&mut near_pool, &near_cam);
  near.generate_indices(&near_pool);

  let mut far_pool = TriNodePool::with_capacity(1 << 17).unwrap();
  let mut far = variance_ready_patch(&source);
  let far_cam = Camera::new(Vec3::new(5.0e4, 0.0, 5.0e4), 600.0);
  far.tessellate(&mut far_pool, &far_cam);
  far.generate_indices(&far_pool);

  assert!(near.triangle_count() > far.triangle_count());
}

/// Pool exhaustion mid-tessellation surfaces as an incomplete result; the
/// partial tree still extracts a valid (under-tessellated) index list.
#[test]
fn test_exhaustion_is_reported_and_nonfatal() {
  let mut pool = TriNodePool::with_capacity(16).unwrap();
  let mut patch = variance_ready_patch(&WaveHeightSource::default());

  let camera = Camera::new(patch.world_mid(), 1.0e6);
  let complete = patch.tessellate(&mut pool, &camera);
  assert!(!complete);
  assert!(pool.out_of_nodes());

  patch.generate_indices(&pool);
  // every allocated pair adds one net triangle to the two roots
  assert_eq!(patch.triangle_count(), 2 + pool.used() / 2);
  assert_eq!(relink_mismatch_count(), 0);
}
