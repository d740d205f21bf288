//! Patch layout and tessellation constants.
//!
//! A patch is a fixed `PATCH_SIZE` × `PATCH_SIZE` square of height-field
//! squares, carrying `(PATCH_SIZE + 1)²` corner samples. Its two triangle
//! trees are addressed by implicit binary-tree path indices (root = 1,
//! children = `2n` / `2n + 1`), the same scheme the variance arrays use.
//!
//! # Vertex grid layout
//!
//! ```text
//!    .-->  x
//!    |   (0,0) ----------- (S,0)
//!    |     | \    right     |
//!    V     |   \   half     |      S = PATCH_SIZE
//!          |     \          |
//!    y     | left  \        |      hypotenuse shared by both
//!          |  half   \      |      root triangles
//!        (0,S) ----------- (S,S)
//! ```
//!
//! Row-major sample indexing: `index = y * (S + 1) + x`.

/// Patch edge length in height-field squares.
pub const PATCH_SIZE: usize = 128;

/// Corner samples per patch edge (`PATCH_SIZE + 1`).
pub const PATCH_VERTS: usize = PATCH_SIZE + 1;

/// Total corner samples owned by one patch.
pub const PATCH_VERT_COUNT: usize = PATCH_VERTS * PATCH_VERTS;

/// Depth bound of the stored variance tree. Nodes with a path index at or
/// beyond `1 << VARIANCE_DEPTH` are still visited during precomputation but
/// never stored.
pub const VARIANCE_DEPTH: u32 = 12;

/// Capacity of one variance array (`2^VARIANCE_DEPTH` implicit tree slots).
pub const VARIANCE_NODES: usize = 1 << VARIANCE_DEPTH;

/// Lower bound for a stored variance value. Strictly positive so the split
/// recursion always terminates through the LOD threshold, and large enough
/// that a perfectly flat patch still refines to unit triangles at
/// point-blank range (`VARIANCE_MIN * PATCH_SIZE * 2 == 1`).
pub const VARIANCE_MIN: f32 = 1.0 / 256.0;

/// Error assumed for nodes beyond the stored variance depth; > 1 so the
/// driver keeps refining where no precomputed value exists.
pub const VARIANCE_FALLBACK: f32 = 10.0;

/// Scale applied to the variance of triangles whose corner heights straddle
/// the zero-height shoreline, and the floor that scaled value is raised to.
pub const SHORE_VARIANCE_SCALE: f32 = 1.5;
pub const SHORE_VARIANCE_MIN: f32 = 20.0;

/// World units per height-field square.
pub const DEFAULT_SQUARE_SIZE: f32 = 8.0;

/// Default total node-pool size requested across all workers of one pass.
pub const DEFAULT_POOL_SIZE: usize = 1 << 20;

/// Upper limit for adaptive pool growth, as a multiple of the initial
/// request.
pub const MAX_POOL_GROWTH: usize = 8;

/// Normalization constant for the camera-distance LOD factor: distances are
/// scaled by `LOD_DISTANCE_SCALE / view_radius` before inversion.
pub const LOD_DISTANCE_SCALE: f32 = 300.0;

/// Variance ceiling per unit of view radius. Clamps huge cliff variances so
/// far-distance detail is bounded while near detail is untouched.
pub const VARIANCE_CEILING_SCALE: f32 = 0.35;

/// Y coordinate of the bottom edge of border-skirt quads.
pub const SKIRT_DEPTH: f32 = -400.0;

/// Convert a patch-local corner coordinate to its row-major sample index.
#[inline(always)]
pub const fn vertex_index(x: usize, y: usize) -> usize {
  y * PATCH_VERTS + x
}
