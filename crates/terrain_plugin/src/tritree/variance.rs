//! Variance precomputation: worst-case height-approximation error per
//! potential split node.
//!
//! For each triangle, the variance is the absolute difference between the
//! true height at the hypotenuse midpoint and the linear interpolation of
//! the two hypotenuse endpoint heights. Values propagate upward as a max,
//! so a parent's stored value is always ≥ any descendant's and the
//! tessellation driver can prune a whole subtree on one comparison.
//!
//! Storage is a fixed array indexed by the implicit binary-tree path
//! (root = 1, children = `2n` / `2n + 1`). Recursion below the storage
//! depth still runs (the propagated max must see the fine detail) but
//! stops writing.

use glam::{IVec2, Vec3};

use crate::constants::{
  SHORE_VARIANCE_MIN, SHORE_VARIANCE_SCALE, VARIANCE_MIN, VARIANCE_NODES,
};
use crate::patch::HeightGrid;

use super::node::Half;

/// Precomputed variance tree for one half of a patch.
pub struct VarianceField {
  values: Vec<f32>,
}

impl VarianceField {
  pub fn new() -> Self {
    Self {
      values: vec![0.0; VARIANCE_NODES],
    }
  }

  /// Stored variance of the node at the given implicit tree index.
  /// Callers check `node < VARIANCE_NODES`.
  #[inline]
  pub fn get(&self, node: usize) -> f32 {
    self.values[node]
  }
}

impl Default for VarianceField {
  fn default() -> Self {
    Self::new()
  }
}

/// Recompute the variance tree of one half from the patch's local heights,
/// seeded with the half's three corner samples.
pub(crate) fn compute_half(field: &mut VarianceField, heights: &HeightGrid, half: Half) {
  field.values.fill(0.0);

  let (left, right, apex) = half.corners();
  let corner_heights = Vec3::new(
    heights.height(left),
    heights.height(right),
    heights.height(apex),
  );

  recurs_compute(field, heights, left, right, apex, corner_heights, 1);
}

/// Depth-first variance computation.
///
/// `heights` carries (left, right, apex) elevations on the stack so the
/// grid is sampled once per vertex instead of three times per triangle.
fn recurs_compute(
  field: &mut VarianceField,
  grid: &HeightGrid,
  left: IVec2,
  right: IVec2,
  apex: IVec2,
  heights: Vec3,
  node: usize,
) -> f32 {
  let mid = (left + right) / 2;
  let mid_height = grid.height(mid);

  // interpolation error at the hypotenuse midpoint
  let mut variance = (mid_height - (heights.x + heights.y) * 0.5).abs();

  // shorelines get amplified variance so coastlines tessellate finely
  // regardless of raw curvature
  if heights.x * heights.y < 0.0 || heights.x * mid_height < 0.0 || heights.y * mid_height < 0.0 {
    variance = (variance * SHORE_VARIANCE_SCALE).max(SHORE_VARIANCE_MIN);
  }

  // detail below a 4-unit hypotenuse is not worth precomputing
  if (left.x - right.x).abs() >= 4 || (left.y - right.y).abs() >= 4 {
    let left_child = recurs_compute(
      field,
      grid,
      apex,
      left,
      mid,
      Vec3::new(heights.z, heights.x, mid_height),
      node * 2,
    );
    let right_child = recurs_compute(
      field,
      grid,
      right,
      apex,
      mid,
      Vec3::new(heights.y, heights.z, mid_height),
      node * 2 + 1,
    );

    // a parent is never reported smoother than its children
    variance = variance.max(left_child).max(right_child);
  }

  // never exactly zero: termination is driven by the LOD threshold, not by
  // zero-variance checks
  variance = variance.max(VARIANCE_MIN);

  if node < VARIANCE_NODES {
    field.values[node] = variance;
  }

  variance
}

#[cfg(test)]
#[path = "variance_test.rs"]
mod variance_test;
