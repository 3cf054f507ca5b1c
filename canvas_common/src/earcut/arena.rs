// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backing store for the circular doubly-linked rings used while ear clipping.
//!
//! Nodes are only ever appended, never physically removed, so a [`NodeId`] stays valid
//! until the arena is reset for the next triangulation.

use core::ops::{Index, IndexMut};

/// An index into a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One polygon vertex during triangulation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Node {
    /// Index of the vertex in the flattened input numbering.
    pub(crate) i: u32,
    pub(crate) x: f64,
    pub(crate) y: f64,
    /// Previous node in the polygon ring.
    pub(crate) prev: NodeId,
    /// Next node in the polygon ring.
    pub(crate) next: NodeId,
    /// Z-order curve value, `0` until the ring has been indexed.
    pub(crate) z: u32,
    /// Previous node in z-order.
    pub(crate) prev_z: Option<NodeId>,
    /// Next node in z-order.
    pub(crate) next_z: Option<NodeId>,
    /// Whether this node is a single-point hole.
    pub(crate) steiner: bool,
}

/// A growable store of [`Node`]s.
#[derive(Debug, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Drop all nodes, keeping the allocation, and make room for at least `capacity` nodes.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.nodes.clear();
        self.nodes.reserve(capacity);
    }

    /// The number of nodes ever created since the last reset.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, i: u32, x: f64, y: f64) -> NodeId {
        debug_assert!(
            u32::try_from(self.nodes.len()).is_ok(),
            "node arena exceeded u32 indices"
        );
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            i,
            x,
            y,
            prev: id,
            next: id,
            z: 0,
            prev_z: None,
            next_z: None,
            steiner: false,
        });
        id
    }

    /// Create a node and link it after `last`, or start a new single-node ring.
    pub(crate) fn insert(&mut self, i: u32, x: f64, y: f64, last: Option<NodeId>) -> NodeId {
        let p = self.push(i, x, y);

        if let Some(last) = last {
            let last_next = self[last].next;
            self[p].next = last_next;
            self[p].prev = last;
            self[last_next].prev = p;
            self[last].next = p;
        }

        p
    }

    /// Unlink a node from its ring and from the z-order list.
    ///
    /// The node itself keeps its `prev`/`next` so callers can still step off it.
    pub(crate) fn remove(&mut self, p: NodeId) {
        let Node {
            prev,
            next,
            prev_z,
            next_z,
            ..
        } = self[p];

        self[next].prev = prev;
        self[prev].next = next;

        if let Some(prev_z) = prev_z {
            self[prev_z].next_z = next_z;
        }
        if let Some(next_z) = next_z {
            self[next_z].prev_z = prev_z;
        }
    }

    /// Link two vertices with a bridge.
    ///
    /// If both vertices belong to the same ring, the ring is split in two. If one belongs to
    /// the outer ring and the other to a hole, the hole is merged into the outer ring.
    /// Returns the duplicate of `b`.
    pub(crate) fn split(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let Node { i: ai, x: ax, y: ay, .. } = self[a];
        let Node { i: bi, x: bx, y: by, .. } = self[b];
        let a2 = self.push(ai, ax, ay);
        let b2 = self.push(bi, bx, by);
        let an = self[a].next;
        let bp = self[b].prev;

        self[a].next = b;
        self[b].prev = a;

        self[a2].next = an;
        self[an].prev = a2;

        self[b2].next = a2;
        self[a2].prev = b2;

        self[bp].next = b2;
        self[b2].prev = bp;

        b2
    }

    #[inline(always)]
    pub(crate) fn next(&self, p: NodeId) -> NodeId {
        self[p].next
    }

    #[inline(always)]
    pub(crate) fn prev(&self, p: NodeId) -> NodeId {
        self[p].prev
    }

    /// Whether two nodes share the same coordinates.
    #[inline(always)]
    pub(crate) fn equals(&self, a: NodeId, b: NodeId) -> bool {
        self[a].x == self[b].x && self[a].y == self[b].y
    }

    /// Twice the signed area of the triangle `p`, `q`, `r`.
    ///
    /// Negative for a convex (clockwise) turn in the ring orientation used here.
    #[inline(always)]
    pub(crate) fn area(&self, p: NodeId, q: NodeId, r: NodeId) -> f64 {
        let (p, q, r) = (&self[p], &self[q], &self[r]);
        (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    #[inline(always)]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    #[inline(always)]
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.idx()]
    }
}
