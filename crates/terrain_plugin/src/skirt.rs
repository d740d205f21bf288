//! Border-skirt extraction: vertical filler geometry along patch edges.
//!
//! Adjacent patches tessellate at independent detail levels and are not
//! neighbor-linked across their shared edge, so hairline cracks can open
//! there. Each boundary leaf contributes one downward-facing quad (opaque
//! at terrain height, transparent at a fixed depth) which visually hides
//! those cracks without touching the mesh topology.
//!
//! The boundary walk alternates left/right descent with recursion-depth
//! parity: at even depths both children touch the patch edge, at odd depths
//! only one does and the descent is biased so the recursion stays on the
//! true edge.

use glam::IVec2;

use crate::constants::SKIRT_DEPTH;
use crate::patch::Patch;
use crate::tritree::node::{Half, NodeRef};
use crate::tritree::split::TreeRef;
use crate::tritree::TriNodePool;
use crate::types::SkirtVertex;

/// Opaque top-edge color.
const SKIRT_TOP: [u8; 4] = [255, 255, 255, 255];
/// Transparent bottom-edge color.
const SKIRT_BOTTOM: [u8; 4] = [255, 255, 255, 0];

impl Patch {
  /// Regenerate the border-skirt vertex list from the current trees.
  /// Meaningful only after a tessellation; consumes the tessellated flag so
  /// repeated calls without a new tessellation do nothing.
  pub fn generate_border_vertices(&mut self, pool: &TriNodePool) {
    if !self.tessellated {
      return;
    }
    self.tessellated = false;

    self.skirts.clear();

    // border leaves always descend from a root that has either no left or
    // no right neighbor, i.e. faces a patch edge
    let (l_left, l_right, l_apex) = Half::Left.corners();
    let (r_left, r_right, r_apex) = Half::Right.corners();

    let borders = [
      (Half::Left, true, l_left, l_right, l_apex),
      (Half::Left, false, l_left, l_right, l_apex),
      (Half::Right, false, r_left, r_right, r_apex),
      (Half::Right, true, r_left, r_right, r_apex),
    ];

    for (half, left_bias, left, right, apex) in borders {
      let open = {
        let root = &self.roots[half.index()];
        if left_bias {
          root.left_neighbor().is_none()
        } else {
          root.right_neighbor().is_none()
        }
      };
      if open {
        self.recurs_border(pool, NodeRef::Root(half), left, right, apex, 1, left_bias);
      }
    }
  }

  fn recurs_border(
    &mut self,
    pool: &TriNodePool,
    tri: NodeRef,
    left: IVec2,
    right: IVec2,
    apex: IVec2,
    depth: u32,
    left_bias: bool,
  ) {
    let children = {
      let tree = TreeRef {
        roots: &self.roots,
        pool,
      };
      tree.node(tri).children()
    };

    let Some(pair) = children else {
      let v_apex = self.world_vertex(apex);
      let v_left = self.world_vertex(left);
      let v_right = self.world_vertex(right);

      if depth & 1 == 0 {
        push_skirt_quad(&mut self.skirts, v_left, v_right);
      } else if left_bias {
        push_skirt_quad(&mut self.skirts, v_apex, v_left);
      } else {
        push_skirt_quad(&mut self.skirts, v_right, v_apex);
      }
      return;
    };

    let center = (left + right) / 2;

    if depth & 1 == 0 {
      // both children lie on the patch edge
      self.recurs_border(pool, pair.left(), apex, left, center, depth + 1, !left_bias);
      self.recurs_border(pool, pair.right(), right, apex, center, depth + 1, left_bias);
      return;
    }

    // only one child stays on the edge; force a left bias below so the
    // recursion ends at the correct leaves
    if left_bias {
      self.recurs_border(pool, pair.left(), apex, left, center, depth + 1, true);
    } else {
      self.recurs_border(pool, pair.right(), right, apex, center, depth + 1, true);
    }
  }
}

/// One skirt quad as two triangles: `a`/`b` at terrain height with full
/// opacity, their drops at [`SKIRT_DEPTH`] fully transparent.
fn push_skirt_quad(out: &mut Vec<SkirtVertex>, a: [f32; 3], b: [f32; 3]) {
  let a_bottom = [a[0], SKIRT_DEPTH, a[2]];
  let b_bottom = [b[0], SKIRT_DEPTH, b[2]];

  out.push(SkirtVertex {
    position: a,
    color: SKIRT_TOP,
  });
  out.push(SkirtVertex {
    position: a_bottom,
    color: SKIRT_BOTTOM,
  });
  out.push(SkirtVertex {
    position: b,
    color: SKIRT_TOP,
  });

  out.push(SkirtVertex {
    position: a_bottom,
    color: SKIRT_BOTTOM,
  });
  out.push(SkirtVertex {
    position: b_bottom,
    color: SKIRT_BOTTOM,
  });
  out.push(SkirtVertex {
    position: b,
    color: SKIRT_TOP,
  });
}

#[cfg(test)]
#[path = "skirt_test.rs"]
mod skirt_test;
