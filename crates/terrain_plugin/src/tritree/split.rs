//! Diamond-preserving triangle split.
//!
//! Splitting a triangle must keep the mesh free of T-junctions: a triangle
//! and its base neighbor (the triangle across the hypotenuse) form a
//! "diamond" and always split together. When the base neighbor is not in a
//! proper diamond with the node being split, it is force-split first, which
//! can cascade through a chain of neighbors until reciprocity holds or the
//! pool runs dry.
//!
//! All node access goes through a borrow context pairing the patch's two
//! root triangles with the worker's pool, so the cyclic neighbor graph is
//! walked through arena indices only.

use std::sync::atomic::{AtomicU64, Ordering};

use super::node::{Half, NodeRef, TriNode};
use super::pool::TriNodePool;

/// Count of neighbor-relink attempts that found no back-reference to the
/// node being split. In a structurally valid mesh this never happens; any
/// nonzero value indicates a topological inconsistency worth investigating.
static RELINK_MISMATCHES: AtomicU64 = AtomicU64::new(0);

/// Total neighbor-relink mismatches observed since process start.
pub fn relink_mismatch_count() -> u64 {
  RELINK_MISMATCHES.load(Ordering::Relaxed)
}

/// Read-only node access over a patch's roots and a pool.
pub(crate) struct TreeRef<'a> {
  pub roots: &'a [TriNode; 2],
  pub pool: &'a TriNodePool,
}

impl TreeRef<'_> {
  #[inline]
  pub fn node(&self, r: NodeRef) -> &TriNode {
    match r {
      NodeRef::Root(half) => &self.roots[half.index()],
      NodeRef::Pool(index) => self.pool.node(index),
    }
  }
}

/// Mutable node access over a patch's roots and a pool; carries the split
/// operation.
pub(crate) struct TreeMut<'a> {
  pub roots: &'a mut [TriNode; 2],
  pub pool: &'a mut TriNodePool,
}

impl TreeMut<'_> {
  #[inline]
  pub fn node(&self, r: NodeRef) -> &TriNode {
    match r {
      NodeRef::Root(half) => &self.roots[half.index()],
      NodeRef::Pool(index) => self.pool.node(index),
    }
  }

  #[inline]
  pub fn node_mut(&mut self, r: NodeRef) -> &mut TriNode {
    match r {
      NodeRef::Root(half) => &mut self.roots[half.index()],
      NodeRef::Pool(index) => self.pool.node_mut(index),
    }
  }

  /// Turn `tri` from a leaf into a branch, preserving mesh continuity.
  ///
  /// Succeeds immediately when `tri` is already a branch. Returns `false`
  /// on pool exhaustion (direct or anywhere in a cascaded split), leaving
  /// the mesh structurally valid but under-tessellated at that location.
  pub fn split(&mut self, tri: NodeRef) -> bool {
    if self.node(tri).is_branch() {
      return true;
    }

    // not in a proper diamond: the base neighbor must itself have `tri` as
    // its base neighbor before both can split together
    if let Some(base) = self.node(tri).base_neighbor {
      if self.node(base).base_neighbor != Some(tri) && !self.split(base) {
        return false;
      }
    }

    let Some(pair) = self.pool.allocate() else {
      return false;
    };

    let parent = *self.node(tri);
    let (left_child, right_child) = (pair.left(), pair.right());

    // children inherit the parent's outer neighbors and are each other's
    // inner neighbors
    {
      let lc = self.node_mut(left_child);
      lc.base_neighbor = parent.left_neighbor;
      lc.left_neighbor = Some(right_child);
    }
    {
      let rc = self.node_mut(right_child);
      rc.base_neighbor = parent.right_neighbor;
      rc.right_neighbor = Some(left_child);
    }
    self.node_mut(tri).children = Some(pair);

    // repoint the outer neighbors from the parent to the adjacent child
    if let Some(left_neighbor) = parent.left_neighbor {
      self.relink_neighbor(left_neighbor, tri, left_child);
    }
    if let Some(right_neighbor) = parent.right_neighbor {
      self.relink_neighbor(right_neighbor, tri, right_child);
    }

    match parent.base_neighbor {
      Some(base) => {
        if let Some(base_pair) = self.node(base).children() {
          // base already split: cross-link the four children, completing
          // the diamond in one step
          let (base_left, base_right) = (base_pair.left(), base_pair.right());
          self.node_mut(base_left).right_neighbor = Some(right_child);
          self.node_mut(base_right).left_neighbor = Some(left_child);
          self.node_mut(left_child).right_neighbor = Some(base_right);
          self.node_mut(right_child).left_neighbor = Some(base_left);
        } else if !self.split(base) {
          // both halves of the diamond split together; the recursive call
          // cross-links the children when it reaches this branch
          return false;
        }
      }
      None => {
        // patch edge: the children face outward into the seam the border
        // skirt covers
        self.node_mut(left_child).right_neighbor = None;
        self.node_mut(right_child).left_neighbor = None;
      }
    }

    true
  }

  /// Repoint whichever of `neighbor`'s three links referenced `parent` to
  /// `child`. A neighbor with no link back to `parent` violates the mesh
  /// topology: loud in debug builds, counted and logged in release.
  fn relink_neighbor(&mut self, neighbor: NodeRef, parent: NodeRef, child: NodeRef) {
    let n = self.node_mut(neighbor);
    if n.base_neighbor == Some(parent) {
      n.base_neighbor = Some(child);
    } else if n.left_neighbor == Some(parent) {
      n.left_neighbor = Some(child);
    } else if n.right_neighbor == Some(parent) {
      n.right_neighbor = Some(child);
    } else {
      RELINK_MISMATCHES.fetch_add(1, Ordering::Relaxed);
      log::warn!("tritree: neighbor {neighbor:?} holds no link back to split node {parent:?}");
      debug_assert!(
        false,
        "neighbor {neighbor:?} holds no link back to split node {parent:?}"
      );
    }
  }
}

/// Root pair with the two halves attached as mutual base neighbors: the
/// initial state of every patch and the state `Patch::reset` restores.
pub(crate) fn linked_roots() -> [TriNode; 2] {
  let mut roots = [TriNode::default(), TriNode::default()];
  roots[Half::Left.index()].base_neighbor = Some(NodeRef::Root(Half::Right));
  roots[Half::Right.index()].base_neighbor = Some(NodeRef::Root(Half::Left));
  roots
}

#[cfg(test)]
#[path = "split_test.rs"]
mod split_test;
