// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ear-clipping triangulation of polygons with holes.
//!
//! The polygon is turned into a circular doubly-linked ring of vertices stored in an arena.
//! Holes are merged into the outer ring through bridge edges, after which ears (convex
//! vertices whose triangle contains no reflex vertex) are cut off one by one. For larger
//! polygons the ear test is accelerated by a z-order curve index.
//!
//! When no ear can be found anymore the ring is repaired with increasingly aggressive
//! strategies:
//!
//! 1. Filter out collinear and duplicate vertices, then clip again.
//! 2. Cure small local self-intersections, then clip again.
//! 3. Split the ring along a valid diagonal and triangulate both halves from scratch.
//!
//! If even that fails, the remaining ring is left untriangulated. Triangulation never fails
//! loudly: degenerate input results in fewer (or no) triangles.
//!
//! The algorithm follows [earcut](https://github.com/mapbox/earcut).

mod arena;
mod holes;
mod zorder;

pub use zorder::HASH_THRESHOLD;

use crate::kurbo::Point;
use arena::{NodeArena, NodeId};
use log::{debug, warn};
use zorder::ZOrder;

/// The stage a ring is in when it is (re)submitted for clipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    /// Plain ear clipping.
    Clip,
    /// Clipping after collinear and duplicate vertices have been removed.
    Filtered,
    /// Clipping after local self-intersections have been cured.
    Cured,
}

/// A reusable ear-clipping triangulator.
///
/// Keeping an `Earcut` around between calls reuses its node arena and scratch buffers.
#[derive(Debug, Default)]
pub struct Earcut {
    nodes: NodeArena,
    /// Rings waiting to be clipped.
    work: Vec<(NodeId, Pass)>,
    /// Leftmost nodes of the holes of the current polygon.
    holes: Vec<NodeId>,
    /// Present when the current polygon is large enough to be hashed.
    curve: Option<ZOrder>,
    /// Number of input vertices linked so far.
    vertices: u32,
}

impl Earcut {
    /// Create a new triangulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangulate the polygon made of `outer` and `holes`, writing the triangles into `out`.
    ///
    /// `out` is cleared first. Each consecutive triple of indices is one triangle, where
    /// vertices are numbered by concatenating `outer` and all `holes` in order. The winding
    /// of the emitted triangles is unspecified.
    ///
    /// Degenerate input (less than three outer points, zero area, holes outside the outer
    /// contour, non-finite coordinates) produces as many triangles as could be found,
    /// possibly none.
    pub fn triangulate<H: AsRef<[Point]>>(
        &mut self,
        outer: &[Point],
        holes: &[H],
        out: &mut Vec<u32>,
    ) {
        out.clear();
        self.work.clear();
        self.curve = None;
        self.vertices = 0;

        if outer.len() < 3 {
            return;
        }

        let total = outer.len() + holes.iter().map(|h| h.as_ref().len()).sum::<usize>();
        if u32::try_from(total).is_err() {
            warn!("polygon with {total} vertices is too large to triangulate");
            return;
        }
        let is_finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        if !outer.iter().all(is_finite) || !holes.iter().all(|h| h.as_ref().iter().all(is_finite))
        {
            warn!("skipping polygon with non-finite coordinates");
            return;
        }

        self.nodes.reset(total * 3 / 2);
        out.reserve((total + 2 * holes.len()) * 3);

        let Some(mut outer_node) = self.linked_list(outer, true) else {
            return;
        };
        if self.nodes.prev(outer_node) == self.nodes.next(outer_node) {
            return;
        }

        if !holes.is_empty() {
            outer_node = self.eliminate_holes(holes, outer_node);
        }

        if total > HASH_THRESHOLD {
            self.curve = ZOrder::from_points(outer);
        }

        self.work.push((outer_node, Pass::Clip));
        while let Some((ear, pass)) = self.work.pop() {
            self.earcut_linked(ear, pass, out);
        }
    }

    /// Create a ring from `points` in the requested winding order.
    fn linked_list(&mut self, points: &[Point], clockwise: bool) -> Option<NodeId> {
        let base = self.vertices;
        let mut last = None;

        if clockwise == (winding_sum(points) > 0.0) {
            for (i, p) in points.iter().enumerate() {
                last = Some(self.nodes.insert(base + i as u32, p.x, p.y, last));
            }
        } else {
            for (i, p) in points.iter().enumerate().rev() {
                last = Some(self.nodes.insert(base + i as u32, p.x, p.y, last));
            }
        }

        if let Some(l) = last {
            if self.nodes.equals(l, self.nodes.next(l)) {
                self.nodes.remove(l);
                last = Some(self.nodes.next(l));
            }
        }

        self.vertices += points.len() as u32;

        last
    }

    /// Remove collinear and duplicate points between `start` and `end`.
    fn filter_points(&mut self, start: NodeId, end: Option<NodeId>) -> NodeId {
        let mut end = end.unwrap_or(start);
        let mut p = start;

        loop {
            let mut again = false;
            let prev = self.nodes.prev(p);
            let next = self.nodes.next(p);

            if !self.nodes[p].steiner
                && (self.nodes.equals(p, next) || self.nodes.area(prev, p, next) == 0.0)
            {
                self.nodes.remove(p);
                p = prev;
                end = prev;
                if p == self.nodes.next(p) {
                    break;
                }
                again = true;
            } else {
                p = next;
            }

            if !again && p == end {
                break;
            }
        }

        end
    }

    /// The main ear slicing loop for one ring.
    fn earcut_linked(&mut self, mut ear: NodeId, pass: Pass, out: &mut Vec<u32>) {
        if pass == Pass::Clip {
            if let Some(curve) = self.curve {
                zorder::index_curve(&mut self.nodes, ear, &curve);
            }
        }

        let mut stop = ear;

        while self.nodes.prev(ear) != self.nodes.next(ear) {
            let prev = self.nodes.prev(ear);
            let next = self.nodes.next(ear);

            let is_ear = match self.curve {
                Some(curve) => self.is_ear_hashed(ear, &curve),
                None => self.is_ear(ear),
            };

            if is_ear {
                out.extend_from_slice(&[self.nodes[prev].i, self.nodes[ear].i, self.nodes[next].i]);
                self.nodes.remove(ear);

                // Skipping the next vertex leads to fewer sliver triangles.
                ear = self.nodes.next(next);
                stop = ear;
                continue;
            }

            ear = next;

            if ear == stop {
                match pass {
                    Pass::Clip => {
                        let start = self.filter_points(ear, None);
                        self.work.push((start, Pass::Filtered));
                    }
                    Pass::Filtered => {
                        let start = self.filter_points(ear, None);
                        let start = self.cure_local_intersections(start, out);
                        self.work.push((start, Pass::Cured));
                    }
                    Pass::Cured => self.split_earcut(ear),
                }
                break;
            }
        }
    }

    /// Whether `ear` forms a valid ear with its neighbours.
    fn is_ear(&self, ear: NodeId) -> bool {
        let a = self.nodes.prev(ear);
        let c = self.nodes.next(ear);

        if self.nodes.area(a, ear, c) >= 0.0 {
            // Reflex, can't be an ear.
            return false;
        }

        let (a_node, b_node, c_node) = (&self.nodes[a], &self.nodes[ear], &self.nodes[c]);
        let mut p = self.nodes.next(c);
        while p != a {
            let node = &self.nodes[p];
            if point_in_triangle(
                a_node.x, a_node.y, b_node.x, b_node.y, c_node.x, c_node.y, node.x, node.y,
            ) && self.nodes.area(node.prev, p, node.next) >= 0.0
            {
                return false;
            }
            p = node.next;
        }

        true
    }

    /// Like [`Self::is_ear`], but only visits nodes close to the ear on the z-order curve.
    fn is_ear_hashed(&self, ear: NodeId, curve: &ZOrder) -> bool {
        let a = self.nodes.prev(ear);
        let c = self.nodes.next(ear);

        if self.nodes.area(a, ear, c) >= 0.0 {
            return false;
        }

        let (a_node, b_node, c_node) = (&self.nodes[a], &self.nodes[ear], &self.nodes[c]);

        let min_x = a_node.x.min(b_node.x).min(c_node.x);
        let min_y = a_node.y.min(b_node.y).min(c_node.y);
        let max_x = a_node.x.max(b_node.x).max(c_node.x);
        let max_y = a_node.y.max(b_node.y).max(c_node.y);

        // Z-order range of the triangle's bounding box.
        let min_z = curve.key(min_x, min_y);
        let max_z = curve.key(max_x, max_y);

        let blocks = |p: NodeId| {
            let node = &self.nodes[p];
            p != a
                && p != c
                && point_in_triangle(
                    a_node.x, a_node.y, b_node.x, b_node.y, c_node.x, c_node.y, node.x, node.y,
                )
                && self.nodes.area(node.prev, p, node.next) >= 0.0
        };

        // First look for points inside the triangle in increasing z-order,
        let mut p = b_node.next_z;
        while let Some(node) = p {
            if self.nodes[node].z > max_z {
                break;
            }
            if blocks(node) {
                return false;
            }
            p = self.nodes[node].next_z;
        }

        // then in decreasing z-order.
        let mut p = b_node.prev_z;
        while let Some(node) = p {
            if self.nodes[node].z < min_z {
                break;
            }
            if blocks(node) {
                return false;
            }
            p = self.nodes[node].prev_z;
        }

        true
    }

    /// Go through all ring nodes and cure small local self-intersections.
    fn cure_local_intersections(&mut self, mut start: NodeId, out: &mut Vec<u32>) -> NodeId {
        let mut p = start;
        loop {
            let a = self.nodes.prev(p);
            let p_next = self.nodes.next(p);
            let b = self.nodes.next(p_next);

            // A self-intersection where edge (v[i-1], v[i]) intersects (v[i+1], v[i+2]).
            if !self.nodes.equals(a, b)
                && self.intersects(a, p, p_next, b)
                && self.locally_inside(a, b)
                && self.locally_inside(b, a)
            {
                out.extend_from_slice(&[self.nodes[a].i, self.nodes[p].i, self.nodes[b].i]);

                self.nodes.remove(p);
                self.nodes.remove(p_next);

                p = b;
                start = b;
            }

            p = self.nodes.next(p);
            if p == start {
                break;
            }
        }

        self.filter_points(p, None)
    }

    /// Try splitting the ring along a diagonal and queue both halves.
    fn split_earcut(&mut self, start: NodeId) {
        let mut a = start;
        loop {
            let mut b = self.nodes.next(self.nodes.next(a));
            while b != self.nodes.prev(a) {
                if self.nodes[a].i != self.nodes[b].i && self.is_valid_diagonal(a, b) {
                    let c = self.nodes.split(a, b);

                    // Filter collinear points around the cuts.
                    let a = self.filter_points(a, Some(self.nodes.next(a)));
                    let c = self.filter_points(c, Some(self.nodes.next(c)));

                    self.work.push((c, Pass::Clip));
                    self.work.push((a, Pass::Clip));
                    return;
                }
                b = self.nodes.next(b);
            }

            a = self.nodes.next(a);
            if a == start {
                break;
            }
        }

        debug!(
            "no valid diagonal found, leaving a ring at ({}, {}) untriangulated",
            self.nodes[start].x, self.nodes[start].y
        );
    }

    /// Whether the diagonal between `a` and `b` lies in the polygon interior.
    fn is_valid_diagonal(&self, a: NodeId, b: NodeId) -> bool {
        let nodes = &self.nodes;
        let (a_prev, a_next) = (nodes.prev(a), nodes.next(a));
        let (b_prev, b_next) = (nodes.prev(b), nodes.next(b));

        nodes[a_next].i != nodes[b].i
            && nodes[a_prev].i != nodes[b].i
            // Doesn't intersect other edges,
            && !self.intersects_polygon(a, b)
            // is locally visible and does not create opposite-facing sectors,
            && ((self.locally_inside(a, b)
                && self.locally_inside(b, a)
                && self.middle_inside(a, b)
                && (nodes.area(a_prev, a, b_prev) != 0.0 || nodes.area(a, b_prev, b) != 0.0))
                // or is the special zero-length case.
                || (nodes.equals(a, b)
                    && nodes.area(a_prev, a, a_next) > 0.0
                    && nodes.area(b_prev, b, b_next) > 0.0))
    }

    /// Whether segment `p1 q1` intersects segment `p2 q2`.
    fn intersects(&self, p1: NodeId, q1: NodeId, p2: NodeId, q2: NodeId) -> bool {
        let nodes = &self.nodes;
        let o1 = sign(nodes.area(p1, q1, p2));
        let o2 = sign(nodes.area(p1, q1, q2));
        let o3 = sign(nodes.area(p2, q2, p1));
        let o4 = sign(nodes.area(p2, q2, q1));

        // General case.
        if o1 != o2 && o3 != o4 {
            return true;
        }

        // Collinear cases: one endpoint lies on the other segment.
        (o1 == 0 && self.on_segment(p1, p2, q1))
            || (o2 == 0 && self.on_segment(p1, q2, q1))
            || (o3 == 0 && self.on_segment(p2, p1, q2))
            || (o4 == 0 && self.on_segment(p2, q1, q2))
    }

    /// For collinear `p`, `q`, `r`, whether `q` lies on segment `p r`.
    fn on_segment(&self, p: NodeId, q: NodeId, r: NodeId) -> bool {
        let (p, q, r) = (&self.nodes[p], &self.nodes[q], &self.nodes[r]);
        q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
    }

    /// Whether the diagonal `a b` intersects any ring edge.
    fn intersects_polygon(&self, a: NodeId, b: NodeId) -> bool {
        let (ai, bi) = (self.nodes[a].i, self.nodes[b].i);
        let mut p = a;
        loop {
            let next = self.nodes.next(p);
            let (pi, ni) = (self.nodes[p].i, self.nodes[next].i);
            if pi != ai && ni != ai && pi != bi && ni != bi && self.intersects(p, next, a, b) {
                return true;
            }
            p = next;
            if p == a {
                return false;
            }
        }
    }

    /// Whether the diagonal `a b` starts inside the polygon at `a`.
    fn locally_inside(&self, a: NodeId, b: NodeId) -> bool {
        let nodes = &self.nodes;
        let (prev, next) = (nodes.prev(a), nodes.next(a));
        if nodes.area(prev, a, next) < 0.0 {
            nodes.area(a, b, next) >= 0.0 && nodes.area(a, prev, b) >= 0.0
        } else {
            nodes.area(a, b, prev) < 0.0 || nodes.area(a, next, b) < 0.0
        }
    }

    /// Whether the middle point of the diagonal `a b` is inside the ring.
    fn middle_inside(&self, a: NodeId, b: NodeId) -> bool {
        let px = (self.nodes[a].x + self.nodes[b].x) / 2.0;
        let py = (self.nodes[a].y + self.nodes[b].y) / 2.0;
        let mut inside = false;
        let mut p = a;
        loop {
            let node = &self.nodes[p];
            let next = &self.nodes[node.next];
            if (node.y > py) != (next.y > py)
                && next.y != node.y
                && px < (next.x - node.x) * (py - node.y) / (next.y - node.y) + node.x
            {
                inside = !inside;
            }
            p = node.next;
            if p == a {
                return inside;
            }
        }
    }
}

/// Triangulate a polygon with holes.
///
/// This is a convenience wrapper around [`Earcut::triangulate`] which allocates a fresh
/// triangulator. Prefer keeping an [`Earcut`] around when triangulating many polygons.
pub fn triangulate<H: AsRef<[Point]>>(outer: &[Point], holes: &[H]) -> Vec<u32> {
    let mut out = Vec::new();
    Earcut::new().triangulate(outer, holes, &mut out);
    out
}

/// The total unsigned area of the triangles in `indices`, indexing into `points`.
///
/// Triangles referring to vertices outside of `points` are ignored.
pub fn triangle_area(points: &[Point], indices: &[u32]) -> f64 {
    indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let a = points.get(tri[0] as usize)?;
            let b = points.get(tri[1] as usize)?;
            let c = points.get(tri[2] as usize)?;
            Some(((b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y)).abs() / 2.0)
        })
        .sum()
}

/// The winding sum `Σ (x2 - x1) (y1 + y2)` of a ring; positive means clockwise.
fn winding_sum(points: &[Point]) -> f64 {
    let Some(mut prev) = points.last() else {
        return 0.0;
    };
    let mut sum = 0.0;
    for p in points {
        sum += (prev.x - p.x) * (p.y + prev.y);
        prev = p;
    }
    sum
}

/// Whether `p` lies within the convex triangle `a b c`, boundary included.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn point_in_triangle(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    px: f64,
    py: f64,
) -> bool {
    (cx - px) * (ay - py) - (ax - px) * (cy - py) >= 0.0
        && (ax - px) * (by - py) - (bx - px) * (ay - py) >= 0.0
        && (bx - px) * (cy - py) - (cx - px) * (by - py) >= 0.0
}

fn sign(val: f64) -> i8 {
    if val < 0.0 {
        -1
    } else if val > 0.0 {
        1
    } else {
        0
    }
}
