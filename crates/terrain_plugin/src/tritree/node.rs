//! Triangle-tree node types: arena references, child pairs, and the node
//! itself.
//!
//! Nodes form a binary tree of triangles over one half of a patch. All
//! relations are non-owning arena references ([`NodeRef`]): children always
//! live in the worker's node pool, while the two root triangles of a patch
//! live outside any pool and are addressed symbolically. This keeps the
//! cyclic neighbor graph (base/left/right links, diamonds sharing children)
//! representable without reference counting or unsafe pointers.

use glam::{ivec2, IVec2};

use crate::constants::PATCH_SIZE;

/// One of the two triangle trees covering a patch, split along the shared
/// hypotenuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Half {
  /// Lower-left root triangle.
  Left,
  /// Upper-right root triangle.
  Right,
}

impl Half {
  /// Both halves, in tessellation order.
  pub const BOTH: [Half; 2] = [Half::Left, Half::Right];

  /// Dense index for per-half storage.
  #[inline]
  pub const fn index(self) -> usize {
    match self {
      Half::Left => 0,
      Half::Right => 1,
    }
  }

  /// Patch-local (left, right, apex) corner coordinates of this half's root
  /// triangle. Left and right are the hypotenuse endpoints.
  #[inline]
  pub fn corners(self) -> (IVec2, IVec2, IVec2) {
    let s = PATCH_SIZE as i32;
    match self {
      Half::Left => (ivec2(0, s), ivec2(s, 0), ivec2(0, 0)),
      Half::Right => (ivec2(s, 0), ivec2(0, s), ivec2(s, s)),
    }
  }
}

/// Non-owning reference to a triangle node: either one of the current
/// patch's two root triangles, or a slot in the worker's node pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRef {
  /// Root triangle of the given half; lives outside the pool and is never
  /// freed individually.
  Root(Half),
  /// Pool slot index.
  Pool(u32),
}

/// Index of the first node of a child pair. Children are always allocated
/// as two consecutive pool slots, so the pair is fully described by its
/// first index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodePair(pub(crate) u32);

impl NodePair {
  /// Left child reference.
  #[inline]
  pub fn left(self) -> NodeRef {
    NodeRef::Pool(self.0)
  }

  /// Right child reference.
  #[inline]
  pub fn right(self) -> NodeRef {
    NodeRef::Pool(self.0 + 1)
  }
}

/// One triangle in the adaptive mesh hierarchy.
///
/// A node is a leaf iff it has no child pair; child references only ever
/// exist as a pair, so "both children absent" and "no child pair" are the
/// same condition by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TriNode {
  pub(crate) children: Option<NodePair>,
  pub(crate) base_neighbor: Option<NodeRef>,
  pub(crate) left_neighbor: Option<NodeRef>,
  pub(crate) right_neighbor: Option<NodeRef>,
}

impl TriNode {
  /// True when this triangle is rendered (has no children).
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// True when this triangle has been split into a child pair.
  #[inline]
  pub fn is_branch(&self) -> bool {
    self.children.is_some()
  }

  /// Child pair, if split.
  #[inline]
  pub fn children(&self) -> Option<NodePair> {
    self.children
  }

  /// Neighbor across the hypotenuse.
  #[inline]
  pub fn base_neighbor(&self) -> Option<NodeRef> {
    self.base_neighbor
  }

  /// Neighbor across the left edge.
  #[inline]
  pub fn left_neighbor(&self) -> Option<NodeRef> {
    self.left_neighbor
  }

  /// Neighbor across the right edge.
  #[inline]
  pub fn right_neighbor(&self) -> Option<NodeRef> {
    self.right_neighbor
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
