//! Bump allocation for triangle-tree nodes.
//!
//! [`TriNodePool`] is a fixed-capacity array handed out two nodes at a time
//! from a cursor; a reset rewinds the cursor and bulk-clears only the region
//! that was in use. [`PoolManager`] owns one pool per rayon worker per
//! render pass, so the tessellation hot path never contends on the
//! allocator: a worker locks its own pool once per patch and the lock is
//! never touched inside a split cascade.
//!
//! Sizing is adaptive in both directions: construction failure retries at
//! 75% of the request instead of failing outright, and a pass that exhausted
//! any pool doubles the pass's target size (up to a fixed cap) before the
//! next pass.

use std::sync::Mutex;

use super::node::{NodePair, TriNode};
use crate::constants::MAX_POOL_GROWTH;
use crate::types::RenderPass;

/// Construction-time pool failure. Exhaustion during tessellation is not an
/// error; it surfaces as `None` from [`TriNodePool::allocate`].
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
  /// The backing store for `requested` nodes could not be allocated.
  #[error("failed to allocate node pool backing store for {requested} nodes")]
  Allocation { requested: usize },

  /// Repeated downsizing brought the request below the minimum useful
  /// size.
  #[error("node pool request of {requested} nodes is too small")]
  TooSmall { requested: usize },
}

/// Fixed-capacity bump allocator for [`TriNode`]s.
pub struct TriNodePool {
  nodes: Vec<TriNode>,
  next: usize,
}

impl TriNodePool {
  /// Create a pool holding `capacity` nodes, rounded up to even (children
  /// are always allocated in pairs). The backing store is reserved
  /// fallibly so an oversized request surfaces as [`PoolError`] instead of
  /// aborting the process.
  pub fn with_capacity(capacity: usize) -> Result<Self, PoolError> {
    let capacity = (capacity + (capacity & 1)).max(2);

    let mut nodes = Vec::new();
    nodes
      .try_reserve_exact(capacity)
      .map_err(|_| PoolError::Allocation {
        requested: capacity,
      })?;
    nodes.resize(capacity, TriNode::default());

    Ok(Self { nodes, next: 0 })
  }

  /// Total node capacity (always even).
  #[inline]
  pub fn capacity(&self) -> usize {
    self.nodes.len()
  }

  /// Nodes handed out since the last reset.
  #[inline]
  pub fn used(&self) -> usize {
    self.next
  }

  /// True when no further pair can be allocated. A fully consumed pool
  /// counts as exhausted even if its last allocation succeeded.
  #[inline]
  pub fn out_of_nodes(&self) -> bool {
    self.next >= self.nodes.len()
  }

  /// Hand out the next pair of fresh nodes, or `None` on exhaustion
  /// (allocating neither).
  #[inline]
  pub fn allocate(&mut self) -> Option<NodePair> {
    if self.out_of_nodes() {
      return None;
    }
    let first = self.next as u32;
    self.next += 2;
    Some(NodePair(first))
  }

  /// Rewind the cursor and clear the region that was in use. O(used):
  /// untouched capacity is already in the default state and is not
  /// reinitialized.
  pub fn reset(&mut self) {
    self.nodes[..self.next].fill(TriNode::default());
    self.next = 0;
  }

  #[inline]
  pub(crate) fn node(&self, index: u32) -> &TriNode {
    &self.nodes[index as usize]
  }

  #[inline]
  pub(crate) fn node_mut(&mut self, index: u32) -> &mut TriNode {
    &mut self.nodes[index as usize]
  }
}

/// Per-pass pool set plus its adaptive sizing state.
struct PassPools {
  pools: Vec<Mutex<TriNodePool>>,
  /// Total size currently requested across all workers of this pass.
  current_size: usize,
  /// Growth ceiling; lowered when construction had to downsize.
  max_size: usize,
}

/// One [`TriNodePool`] per rayon worker per render pass.
///
/// Constructed once and passed by reference into tessellation calls; there
/// is no process-wide pool state. Resets and resizing happen between
/// passes, never concurrently with in-flight splits.
pub struct PoolManager {
  passes: [PassPools; RenderPass::COUNT],
}

impl PoolManager {
  /// Build pools for every pass, splitting `pool_size_hint` nodes across
  /// rayon's workers.
  pub fn new(pool_size_hint: usize) -> Result<Self, PoolError> {
    Self::with_workers(pool_size_hint, rayon::current_num_threads().max(1))
  }

  /// Build pools for an explicit worker count.
  pub fn with_workers(pool_size_hint: usize, workers: usize) -> Result<Self, PoolError> {
    let workers = workers.max(1);
    let normal = build_pools(pool_size_hint, workers)?;
    let shadow = build_pools(pool_size_hint, workers)?;

    Ok(Self {
      passes: [
        PassPools {
          pools: normal.0,
          current_size: normal.1,
          max_size: normal.1.saturating_mul(MAX_POOL_GROWTH),
        },
        PassPools {
          pools: shadow.0,
          current_size: shadow.1,
          max_size: shadow.1.saturating_mul(MAX_POOL_GROWTH),
        },
      ],
    })
  }

  /// The calling worker's pool for the given pass. Outside a rayon worker
  /// (tests, single-threaded callers) the first pool is used.
  #[inline]
  pub fn worker_pool(&self, pass: RenderPass) -> &Mutex<TriNodePool> {
    let pools = &self.passes[pass.index()].pools;
    let worker = rayon::current_thread_index().unwrap_or(0);
    &pools[worker.min(pools.len() - 1)]
  }

  /// Number of worker pools held for a pass.
  pub fn worker_count(&self, pass: RenderPass) -> usize {
    self.passes[pass.index()].pools.len()
  }

  /// Total node capacity across a pass's pools.
  pub fn total_capacity(&self, pass: RenderPass) -> usize {
    self.passes[pass.index()]
      .pools
      .iter()
      .map(|p| p.lock().unwrap().capacity())
      .sum()
  }

  /// True when any pool of the pass ran dry since its last reset.
  pub fn any_exhausted(&self, pass: RenderPass) -> bool {
    self.passes[pass.index()]
      .pools
      .iter()
      .any(|p| p.lock().unwrap().out_of_nodes())
  }

  /// Reset every pool of the pass. If any pool was exhausted during the
  /// prior tessellation, the pass's target size is doubled (capped at
  /// [`MAX_POOL_GROWTH`]× the original request) and the pools rebuilt, so
  /// the next pass runs with capacity matched to observed demand.
  pub fn reset_all(&mut self, pass: RenderPass) {
    let pp = &mut self.passes[pass.index()];

    let mut out_of_nodes = false;
    for pool in &pp.pools {
      let mut pool = pool.lock().unwrap();
      out_of_nodes |= pool.out_of_nodes();
      pool.reset();
    }

    if !out_of_nodes || pp.current_size >= pp.max_size {
      return;
    }

    let grown = (pp.current_size * 2).min(pp.max_size);
    log::debug!(
      "node pools exhausted, growing {:?} pass pools {} -> {} nodes",
      pass,
      pp.current_size,
      grown
    );

    let workers = pp.pools.len();
    match build_pools(grown, workers) {
      Ok((pools, achieved)) => {
        pp.pools = pools;
        pp.current_size = achieved;
        if achieved < grown {
          pp.max_size = achieved;
        }
      }
      Err(err) => {
        // keep the freshly reset pools at their current size
        log::error!("node pool growth failed, staying at current size: {err}");
        pp.max_size = pp.current_size;
      }
    }
  }
}

/// Build one pool per worker for a total of `requested` nodes. Each
/// worker's share is bounded below by a third of the request so high worker
/// counts do not starve individual pools. On allocation failure the whole
/// set is retried at 75% of the request; the achieved total is returned
/// alongside the pools.
fn build_pools(
  requested: usize,
  workers: usize,
) -> Result<(Vec<Mutex<TriNodePool>>, usize), PoolError> {
  let mut requested = requested;

  loop {
    if requested < 2 {
      return Err(PoolError::TooSmall { requested });
    }

    let per_worker = (requested / workers).max(requested / 3);

    let mut pools = Vec::with_capacity(workers);
    let mut failed = false;
    for _ in 0..workers {
      match TriNodePool::with_capacity(per_worker) {
        Ok(pool) => pools.push(Mutex::new(pool)),
        Err(err) => {
          log::error!(
            "node pool construction failed ({err}), retrying at 75% of {requested} nodes"
          );
          failed = true;
          break;
        }
      }
    }

    if !failed {
      return Ok((pools, requested));
    }

    // degrade rather than crash: drop a quarter of the request and retry
    requested -= requested >> 2;
  }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
