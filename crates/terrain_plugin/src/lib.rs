//! terrain_plugin - Framework/engine independent adaptive terrain
//! tessellation
//!
//! This crate refines a regular terrain height-grid into a triangle mesh
//! whose density varies with viewer distance and surface curvature,
//! producing the minimal triangle count that still looks smooth from a
//! given camera. Terrain is split into fixed-size patches, each covered by
//! two binary triangle trees; a precomputed per-triangle variance
//! (curvature error) drives a diamond-preserving split so the mesh stays
//! free of T-junction cracks.
//!
//! # Features
//!
//! - **Variance precomputation**: per-patch curvature-error trees, computed
//!   once per height change with max-propagation for one-comparison subtree
//!   pruning
//! - **Diamond-preserving split**: restricted-quadtree invariant with
//!   neighbor relinking, over bump-allocated node pools
//! - **Per-worker node pools**: lock-free hot path, adaptive pool growth on
//!   observed exhaustion
//! - **Border skirts**: downward-facing edge geometry hiding cracks between
//!   patches tessellated at different detail levels
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use terrain_plugin::{
//!     tessellate_pass, Camera, PoolManager, RenderPass, Terrain,
//!     TerrainConfig, WaveHeightSource,
//! };
//!
//! let source = WaveHeightSource::default();
//! let mut terrain = Terrain::new(TerrainConfig::default(), 8, 8, &source);
//! let mut pools = PoolManager::new(1 << 20)?;
//!
//! let camera = Camera::new(Vec3::new(512.0, 200.0, 512.0), 1000.0);
//! terrain.update_visibility(RenderPass::Normal, 1, |_min, _max| true);
//!
//! let stats = tessellate_pass(&mut terrain, &mut pools, &camera, RenderPass::Normal, 1);
//! println!("{} patches, {} triangles", stats.patches, stats.triangles);
//! ```

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use types::{Camera, GridRect, PassStats, RenderPass, SkirtVertex};

// Height-field access (the external data source interface)
pub mod heightfield;
pub use heightfield::{ConstHeightSource, GridHeightSource, HeightSource, WaveHeightSource};

// Binary triangle tree: nodes, pools, split, variance
pub mod tritree;
pub use tritree::{relink_mismatch_count, PoolError, PoolManager, TriNodePool, VarianceField};

// The unit of tessellation
pub mod patch;
pub use patch::Patch;

// Border-skirt extraction
pub mod skirt;

// LOD parameters and the per-patch split driver
pub mod tessellation;

// Colored parallel pass scheduling
pub mod scheduler;
pub use scheduler::tessellate_pass;

// Terrain facade
pub mod terrain;
pub use terrain::{Terrain, TerrainConfig};
