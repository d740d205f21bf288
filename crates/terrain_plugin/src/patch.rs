//! The unit of tessellation: one fixed-size square tile of the height
//! field with its own two-half binary triangle mesh.
//!
//! A patch owns a local snapshot of its `(PATCH_SIZE + 1)²` corner heights,
//! the two root triangles its trees grow from, one precomputed variance
//! field per half, and the derived index / border-skirt buffers the
//! renderer consumes. Tree nodes below the roots live in the worker pool
//! the patch was last tessellated with, so extraction walks take that pool
//! by reference and outputs stay valid until the pool is next reset.

use glam::{ivec2, IVec2, Vec3};

use crate::constants::{vertex_index, PATCH_SIZE, PATCH_VERT_COUNT};
use crate::heightfield::HeightSource;
use crate::tritree::node::{Half, NodeRef, TriNode};
use crate::tritree::split::{linked_roots, TreeRef};
use crate::tritree::variance::{compute_half, VarianceField};
use crate::tritree::TriNodePool;
use crate::types::{GridRect, RenderPass, SkirtVertex};

/// Local corner-height snapshot of one patch, row-major.
pub(crate) struct HeightGrid {
  samples: Vec<f32>,
}

impl HeightGrid {
  fn new() -> Self {
    Self {
      samples: vec![0.0; PATCH_VERT_COUNT],
    }
  }

  /// Height at a patch-local corner coordinate.
  #[inline]
  pub fn height(&self, p: IVec2) -> f32 {
    self.samples[vertex_index(p.x as usize, p.y as usize)]
  }

  #[inline]
  fn set(&mut self, p: IVec2, height: f32) {
    self.samples[vertex_index(p.x as usize, p.y as usize)] = height;
  }
}

/// Patch-local corner coordinate to vertex-buffer index.
#[inline]
fn grid_index(p: IVec2) -> u32 {
  vertex_index(p.x as usize, p.y as usize) as u32
}

/// One terrain tile and its adaptive triangle mesh.
pub struct Patch {
  /// Global grid coordinate of this patch's (0,0) corner sample.
  origin: IVec2,
  square_size: f32,

  pub(crate) heights: HeightGrid,
  min_height: f32,
  max_height: f32,
  pub(crate) mean_height: f32,

  /// Root triangles of the two halves; never pool-allocated.
  pub(crate) roots: [TriNode; 2],
  /// One variance tree per half. Two separate arrays: the halves are
  /// independent traversals and must never alias.
  pub(crate) variance: [VarianceField; 2],

  /// Heights changed since the variance trees were last computed.
  dirty: bool,
  /// A tessellation ran since the skirts were last generated.
  pub(crate) tessellated: bool,

  indices: Vec<u32>,
  pub(crate) skirts: Vec<SkirtVertex>,

  last_visible_frame: [u64; RenderPass::COUNT],
}

impl Patch {
  /// Create the patch at tile position `(tile_x, tile_y)` with all heights
  /// zero. Heights are loaded with [`Patch::update_heights`].
  pub fn new(tile_x: usize, tile_y: usize, square_size: f32) -> Self {
    Self {
      origin: ivec2(
        (tile_x * PATCH_SIZE) as i32,
        (tile_y * PATCH_SIZE) as i32,
      ),
      square_size,
      heights: HeightGrid::new(),
      min_height: 0.0,
      max_height: 0.0,
      mean_height: 0.0,
      roots: linked_roots(),
      variance: [VarianceField::new(), VarianceField::new()],
      dirty: true,
      tessellated: false,
      indices: Vec::new(),
      skirts: Vec::new(),
      last_visible_frame: [0; RenderPass::COUNT],
    }
  }

  /// Global grid coordinate of the (0,0) corner sample.
  #[inline]
  pub fn origin(&self) -> IVec2 {
    self.origin
  }

  /// Global grid rectangle of the corner samples this patch owns.
  pub fn grid_rect(&self) -> GridRect {
    let s = PATCH_SIZE as i32;
    GridRect::new(self.origin, self.origin + ivec2(s, s))
  }

  /// Heights changed since the last variance computation.
  #[inline]
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Drop the grown trees, restoring the two mutually-linked root leaves.
  /// Called before every re-tessellation; node storage is reclaimed by the
  /// pool reset, not here.
  pub fn reset(&mut self) {
    self.roots = linked_roots();
  }

  /// Copy the overlap of `region` (global grid coordinates, inclusive) out
  /// of the height source and mark the variance trees stale. Returns
  /// `false` when the region does not touch this patch.
  pub fn update_heights<H: HeightSource>(&mut self, source: &H, region: GridRect) -> bool {
    let Some(overlap) = region.intersect(&self.grid_rect()) else {
      return false;
    };

    for y in overlap.min.y..=overlap.max.y {
      for x in overlap.min.x..=overlap.max.x {
        let local = ivec2(x, y) - self.origin;
        self.heights.set(local, source.sample(x, y));
      }
    }

    self.refresh_height_stats();
    self.dirty = true;
    true
  }

  fn refresh_height_stats(&mut self) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    for &h in &self.heights.samples {
      min = min.min(h);
      max = max.max(h);
      sum += h as f64;
    }
    self.min_height = min;
    self.max_height = max;
    self.mean_height = (sum / self.heights.samples.len() as f64) as f32;
  }

  /// Recompute both variance trees from the local heights and clear the
  /// dirty flag. Runs once per height change, not per frame.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "patch::compute_variance"))]
  pub fn compute_variance(&mut self) {
    let Self {
      heights, variance, ..
    } = self;
    for half in Half::BOTH {
      compute_half(&mut variance[half.index()], heights, half);
    }
    self.dirty = false;
  }

  /// Walk every leaf of both trees and emit its corner vertex indices in
  /// apex-left-right order. Valid only while `pool` still holds this
  /// patch's nodes (i.e. until the pool's next reset).
  pub fn generate_indices(&mut self, pool: &TriNodePool) {
    let Self { roots, indices, .. } = self;
    indices.clear();

    let tree = TreeRef { roots, pool };
    for half in Half::BOTH {
      let (left, right, apex) = half.corners();
      recurs_gen_indices(&tree, NodeRef::Root(half), left, right, apex, indices);
    }
  }

  /// Triangle corner indices into this patch's vertex grid, from the last
  /// [`Patch::generate_indices`].
  #[inline]
  pub fn indices(&self) -> &[u32] {
    &self.indices
  }

  /// Border-skirt vertices from the last
  /// [`Patch::generate_border_vertices`].
  #[inline]
  pub fn skirts(&self) -> &[SkirtVertex] {
    &self.skirts
  }

  /// Triangles in the current index list.
  #[inline]
  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// World-space position of a patch-local corner.
  #[inline]
  pub(crate) fn world_vertex(&self, p: IVec2) -> [f32; 3] {
    [
      (self.origin.x + p.x) as f32 * self.square_size,
      self.heights.height(p),
      (self.origin.y + p.y) as f32 * self.square_size,
    ]
  }

  /// World-space midpoint of the patch at its mean height; the reference
  /// point for camera-distance LOD.
  pub(crate) fn world_mid(&self) -> Vec3 {
    let half = (PATCH_SIZE / 2) as i32;
    Vec3::new(
      (self.origin.x + half) as f32 * self.square_size,
      self.mean_height,
      (self.origin.y + half) as f32 * self.square_size,
    )
  }

  /// World-space bounding box (min corner, max corner) for the external
  /// frustum-culling collaborator.
  pub fn bounds(&self) -> (Vec3, Vec3) {
    let s = PATCH_SIZE as f32 * self.square_size;
    let min = Vec3::new(
      self.origin.x as f32 * self.square_size,
      self.min_height,
      self.origin.y as f32 * self.square_size,
    );
    (min, min + Vec3::new(s, self.max_height - self.min_height, s))
  }

  /// Record that this patch was inside the frustum of the given pass at
  /// `frame`.
  #[inline]
  pub fn mark_visible(&mut self, pass: RenderPass, frame: u64) {
    self.last_visible_frame[pass.index()] = frame;
  }

  /// A patch is visible iff its stored frame number is not older than the
  /// current frame.
  #[inline]
  pub fn is_visible(&self, pass: RenderPass, frame: u64) -> bool {
    self.last_visible_frame[pass.index()] >= frame
  }
}

fn recurs_gen_indices(
  tree: &TreeRef,
  tri: NodeRef,
  left: IVec2,
  right: IVec2,
  apex: IVec2,
  out: &mut Vec<u32>,
) {
  match tree.node(tri).children() {
    None => {
      out.push(grid_index(apex));
      out.push(grid_index(left));
      out.push(grid_index(right));
    }
    Some(pair) => {
      let center = (left + right) / 2;
      recurs_gen_indices(tree, pair.left(), apex, left, center, out);
      recurs_gen_indices(tree, pair.right(), right, apex, center, out);
    }
  }
}

#[cfg(test)]
#[path = "patch_test.rs"]
mod patch_test;
