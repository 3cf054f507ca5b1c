// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A z-order curve index over the nodes of a ring, used to speed up ear tests on large
//! polygons.

use super::arena::{NodeArena, NodeId};
use peniko::kurbo::Point;

/// Rings with more vertices than this are indexed along a z-order curve.
pub const HASH_THRESHOLD: usize = 80;

/// The largest coordinate value on each axis of the curve (15 bits).
const Z_RANGE: f64 = 32767.0;

/// Maps coordinates inside a bounding box onto the z-order curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ZOrder {
    min_x: f64,
    min_y: f64,
    inv_size: f64,
}

impl ZOrder {
    /// Build the mapping from the bounding box of `points`.
    ///
    /// Returns `None` when the points are empty or all coincide, in which case
    /// the curve would carry no information.
    pub(crate) fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let size = (max_x - min_x).max(max_y - min_y);
        if size > 0.0 {
            Some(Self {
                min_x,
                min_y,
                inv_size: 1.0 / size,
            })
        } else {
            None
        }
    }

    /// The z-order value of a point.
    pub(crate) fn key(&self, x: f64, y: f64) -> u32 {
        let x = (Z_RANGE * (x - self.min_x) * self.inv_size).clamp(0.0, Z_RANGE) as u32;
        let y = (Z_RANGE * (y - self.min_y) * self.inv_size).clamp(0.0, Z_RANGE) as u32;
        interleave(x) | (interleave(y) << 1)
    }
}

/// Spread the lower 16 bits of `v` onto the even bits.
fn interleave(mut v: u32) -> u32 {
    v = (v | (v << 8)) & 0x00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333;
    v = (v | (v << 1)) & 0x5555_5555;
    v
}

/// Interlink the nodes of the ring starting at `start` in z-order.
pub(crate) fn index_curve(nodes: &mut NodeArena, start: NodeId, curve: &ZOrder) {
    let mut p = start;
    loop {
        let node = &mut nodes[p];
        if node.z == 0 {
            node.z = curve.key(node.x, node.y);
        }
        node.prev_z = Some(node.prev);
        node.next_z = Some(node.next);
        p = node.next;
        if p == start {
            break;
        }
    }

    if let Some(tail) = nodes[p].prev_z {
        nodes[tail].next_z = None;
    }
    nodes[p].prev_z = None;

    sort_linked(nodes, p);
}

/// Simon Tatham's linked list merge sort, over the `next_z` links.
///
/// See <https://www.chiark.greenend.org.uk/~sgtatham/algorithms/listsort.html>.
fn sort_linked(nodes: &mut NodeArena, head: NodeId) {
    let mut list = Some(head);
    let mut in_size = 1;

    loop {
        let mut p = list;
        list = None;
        let mut tail: Option<NodeId> = None;
        let mut num_merges = 0;

        while let Some(mut p_node) = p {
            num_merges += 1;
            let mut q = Some(p_node);
            let mut p_size = 0;
            for _ in 0..in_size {
                p_size += 1;
                q = q.and_then(|q| nodes[q].next_z);
                if q.is_none() {
                    break;
                }
            }
            let mut q_size = in_size;

            while p_size > 0 || (q_size > 0 && q.is_some()) {
                let take_q = match q {
                    Some(q_node) => {
                        p_size == 0 || (q_size > 0 && nodes[p_node].z > nodes[q_node].z)
                    }
                    None => false,
                };
                let e = match q {
                    Some(q_node) if take_q => {
                        q = nodes[q_node].next_z;
                        q_size -= 1;
                        q_node
                    }
                    _ => {
                        let e = p_node;
                        p_size -= 1;
                        if let Some(next) = nodes[p_node].next_z {
                            p_node = next;
                        }
                        e
                    }
                };

                match tail {
                    Some(tail) => nodes[tail].next_z = Some(e),
                    None => list = Some(e),
                }
                nodes[e].prev_z = tail;
                tail = Some(e);
            }

            p = q;
        }

        if let Some(tail) = tail {
            nodes[tail].next_z = None;
        }

        if num_merges <= 1 {
            return;
        }

        in_size *= 2;
    }
}
