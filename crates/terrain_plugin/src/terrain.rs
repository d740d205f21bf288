//! Terrain facade: the patch grid and its configuration.
//!
//! Owns every [`Patch`] of a terrain, fans height-field changes out to the
//! patches they touch, and runs the external frustum query over patch
//! bounds to stamp per-pass visibility frames. Device-buffer upload and
//! draw submission stay with the rendering collaborator; it reads the
//! per-patch index and skirt buffers through [`Terrain::patch`].

use glam::Vec3;

use crate::constants::{DEFAULT_POOL_SIZE, DEFAULT_SQUARE_SIZE, PATCH_SIZE};
use crate::heightfield::HeightSource;
use crate::patch::Patch;
use crate::types::{GridRect, RenderPass};

/// Terrain-wide configuration.
#[derive(Clone, Copy, Debug)]
pub struct TerrainConfig {
  /// World units per height-field square.
  pub square_size: f32,
  /// Total node-pool size requested per pass across all workers.
  pub pool_size_hint: usize,
}

impl Default for TerrainConfig {
  fn default() -> Self {
    Self {
      square_size: DEFAULT_SQUARE_SIZE,
      pool_size_hint: DEFAULT_POOL_SIZE,
    }
  }
}

impl TerrainConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_square_size(mut self, square_size: f32) -> Self {
    self.square_size = square_size;
    self
  }

  pub fn with_pool_size_hint(mut self, pool_size_hint: usize) -> Self {
    self.pool_size_hint = pool_size_hint;
    self
  }
}

/// A grid of patches over one height field.
pub struct Terrain {
  config: TerrainConfig,
  patches: Vec<Patch>,
  patches_x: usize,
  patches_y: usize,
}

impl Terrain {
  /// Build a `patches_x` × `patches_y` tile grid and load every patch's
  /// heights from the source.
  pub fn new<H: HeightSource>(
    config: TerrainConfig,
    patches_x: usize,
    patches_y: usize,
    source: &H,
  ) -> Self {
    let mut patches = Vec::with_capacity(patches_x * patches_y);
    for y in 0..patches_y {
      for x in 0..patches_x {
        let mut patch = Patch::new(x, y, config.square_size);
        let rect = patch.grid_rect();
        patch.update_heights(source, rect);
        patches.push(patch);
      }
    }

    Self {
      config,
      patches,
      patches_x,
      patches_y,
    }
  }

  pub fn config(&self) -> &TerrainConfig {
    &self.config
  }

  /// Tiles per row.
  #[inline]
  pub fn patches_x(&self) -> usize {
    self.patches_x
  }

  /// Tiles per column.
  #[inline]
  pub fn patches_y(&self) -> usize {
    self.patches_y
  }

  /// Patch at tile position `(x, y)`.
  pub fn patch(&self, x: usize, y: usize) -> &Patch {
    &self.patches[y * self.patches_x + x]
  }

  /// Mutable patch at tile position `(x, y)`.
  pub fn patch_mut(&mut self, x: usize, y: usize) -> &mut Patch {
    &mut self.patches[y * self.patches_x + x]
  }

  /// All patches, row-major.
  pub fn patches(&self) -> &[Patch] {
    &self.patches
  }

  pub(crate) fn patches_mut(&mut self) -> &mut [Patch] {
    &mut self.patches
  }

  /// Push a changed height-field region (global grid coordinates,
  /// inclusive) into every patch it touches, marking them dirty. Their
  /// variance is recomputed on the next pass.
  pub fn update_heights<H: HeightSource>(&mut self, source: &H, region: GridRect) -> usize {
    self
      .patches
      .iter_mut()
      .map(|p| p.update_heights(source, region))
      .filter(|&changed| changed)
      .count()
  }

  /// Stamp `frame` on every patch whose bounds the caller-supplied frustum
  /// query accepts. The query sees world-space (min, max) AABB corners;
  /// the culling math itself is the caller's.
  pub fn update_visibility<F>(&mut self, pass: RenderPass, frame: u64, mut in_view: F)
  where
    F: FnMut(Vec3, Vec3) -> bool,
  {
    for patch in &mut self.patches {
      let (min, max) = patch.bounds();
      if in_view(min, max) {
        patch.mark_visible(pass, frame);
      }
    }
  }

  /// Total corner samples per terrain edge, for sizing external height
  /// sources.
  pub fn grid_extent(&self) -> (usize, usize) {
    (
      self.patches_x * PATCH_SIZE + 1,
      self.patches_y * PATCH_SIZE + 1,
    )
  }
}

#[cfg(test)]
#[path = "terrain_test.rs"]
mod terrain_test;
