//! LOD-driven tessellation of a single patch.
//!
//! Each refresh walks the two triangle trees from their roots, comparing
//! every node's precomputed variance, scaled by patch size, triangle
//! extent, and a camera-distance factor, against a unit threshold. At or
//! above the threshold the node splits and both children are walked;
//! below it the subtree is pruned (variance propagates upward as a max, so
//! one comparison covers all descendants).

use glam::{IVec2, Vec3};

use crate::constants::{
  LOD_DISTANCE_SCALE, PATCH_SIZE, VARIANCE_CEILING_SCALE, VARIANCE_FALLBACK, VARIANCE_NODES,
};
use crate::patch::Patch;
use crate::tritree::node::{Half, NodeRef};
use crate::tritree::split::TreeMut;
use crate::tritree::{TriNodePool, VarianceField};
use crate::types::Camera;

/// Per-patch LOD parameters, computed once per tessellation.
pub(crate) struct LodParams {
  /// Inverse of the clamped, view-radius-normalized camera distance; ≤ 1.
  cam_dist_factor: f32,
  /// Ceiling applied to stored variances. Huge cliffs cause huge variances
  /// that would otherwise tessellate regardless of camera distance.
  variance_ceiling: f32,
}

impl LodParams {
  pub fn new(patch_mid: Vec3, camera: &Camera) -> Self {
    let mut factor = patch_mid.distance(camera.position);
    factor *= LOD_DISTANCE_SCALE / camera.view_radius;
    factor = factor.max(1.0);

    Self {
      cam_dist_factor: 1.0 / factor,
      variance_ceiling: camera.view_radius * VARIANCE_CEILING_SCALE,
    }
  }
}

impl Patch {
  /// Grow both triangle trees to the detail the camera warrants,
  /// allocating nodes from `pool`.
  ///
  /// Returns `true` while the pool still has capacity; `false` signals the
  /// patch is under-tessellated this frame, which callers treat as
  /// nonfatal. The caller guarantees no adjacent patch is tessellated
  /// concurrently.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "patch::tessellate"))]
  pub fn tessellate(&mut self, pool: &mut TriNodePool, camera: &Camera) -> bool {
    self.tessellated = true;

    let lod = LodParams::new(self.world_mid(), camera);

    let Self {
      roots, variance, ..
    } = self;
    let mut tree = TreeMut {
      roots,
      pool: &mut *pool,
    };

    for half in Half::BOTH {
      let (left, right, apex) = half.corners();
      recurs_tessellate(
        &mut tree,
        &variance[half.index()],
        &lod,
        NodeRef::Root(half),
        left,
        right,
        apex,
        1,
      );
    }

    !pool.out_of_nodes()
  }
}

#[allow(clippy::too_many_arguments)]
fn recurs_tessellate(
  tree: &mut TreeMut,
  variance: &VarianceField,
  lod: &LodParams,
  tri: NodeRef,
  left: IVec2,
  right: IVec2,
  apex: IVec2,
  node: usize,
) {
  // fully refined: the hypotenuse spans at most one grid unit per axis
  if (left.x - right.x).abs() <= 1 && (left.y - right.y).abs() <= 1 {
    return;
  }

  // beyond the stored depth the fallback keeps refinement going
  let mut tri_variance = VARIANCE_FALLBACK;

  if node < VARIANCE_NODES {
    let size = (left.x - right.x).abs().max((left.y - right.y).abs()) as f32;

    // distance, variance and patch size together decide the split
    tri_variance = variance.get(node).min(lod.variance_ceiling)
      * PATCH_SIZE as f32
      * size
      * lod.cam_dist_factor;
  }

  if tri_variance < 1.0 {
    return;
  }

  if !tree.split(tri) {
    // pool ran dry; the leaf stays as-is
    return;
  }

  if let Some(pair) = tree.node(tri).children() {
    let center = (left + right) / 2;
    recurs_tessellate(tree, variance, lod, pair.left(), apex, left, center, node * 2);
    recurs_tessellate(
      tree,
      variance,
      lod,
      pair.right(),
      right,
      apex,
      center,
      node * 2 + 1,
    );
  }
}

#[cfg(test)]
#[path = "tessellation_test.rs"]
mod tessellation_test;
