// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merging holes into the outer ring through bridge edges.

use super::arena::NodeId;
use super::{point_in_triangle, Earcut};
use crate::kurbo::Point;
use log::debug;

impl Earcut {
    /// Link every hole into the outer ring, leftmost holes first.
    pub(super) fn eliminate_holes<H: AsRef<[Point]>>(
        &mut self,
        holes: &[H],
        mut outer: NodeId,
    ) -> NodeId {
        let mut queue = core::mem::take(&mut self.holes);
        queue.clear();

        for hole in holes {
            let Some(list) = self.linked_list(hole.as_ref(), false) else {
                continue;
            };
            if list == self.nodes.next(list) {
                self.nodes[list].steiner = true;
            }
            queue.push(self.get_leftmost(list));
        }

        let nodes = &self.nodes;
        queue.sort_by(|&a, &b| {
            nodes[a]
                .x
                .total_cmp(&nodes[b].x)
                .then(nodes[a].y.total_cmp(&nodes[b].y))
        });

        for &hole in &queue {
            outer = self.eliminate_hole(hole, outer);
        }

        self.holes = queue;
        outer
    }

    /// Find a bridge between a hole and the outer ring and link them.
    fn eliminate_hole(&mut self, hole: NodeId, outer: NodeId) -> NodeId {
        let Some(bridge) = self.find_hole_bridge(hole, outer) else {
            debug!(
                "hole at ({}, {}) has no bridge to the outer ring, ignoring it",
                self.nodes[hole].x, self.nodes[hole].y
            );
            return outer;
        };

        let bridge_reverse = self.nodes.split(bridge, hole);

        // Filter collinear points around the cuts.
        self.filter_points(bridge_reverse, Some(self.nodes.next(bridge_reverse)));
        self.filter_points(bridge, Some(self.nodes.next(bridge)))
    }

    /// David Eberly's algorithm for finding a bridge between a hole and the outer ring.
    fn find_hole_bridge(&self, hole: NodeId, outer: NodeId) -> Option<NodeId> {
        let nodes = &self.nodes;
        let (hx, hy) = (nodes[hole].x, nodes[hole].y);
        let mut qx = f64::NEG_INFINITY;
        let mut m = None;

        if nodes.equals(hole, outer) {
            return Some(outer);
        }

        // Find a segment intersected by a ray from the hole's leftmost point to the left.
        // The segment's endpoint with the lesser x is a potential connection point.
        let mut p = outer;
        loop {
            let next = nodes.next(p);
            if nodes.equals(hole, next) {
                return Some(next);
            }
            let (px, py) = (nodes[p].x, nodes[p].y);
            let (nx, ny) = (nodes[next].x, nodes[next].y);
            if hy <= py && hy >= ny && ny != py {
                let x = px + (hy - py) * (nx - px) / (ny - py);
                if x <= hx && x > qx {
                    qx = x;
                    let candidate = if px < nx { p } else { next };
                    if x == hx {
                        // The hole touches the outer segment, pick the leftmost endpoint.
                        return Some(candidate);
                    }
                    m = Some(candidate);
                }
            }
            p = next;
            if p == outer {
                break;
            }
        }

        let mut m = m?;

        // Look for points inside the triangle of hole point, segment intersection and
        // endpoint. If there are none, the endpoint is the connection point. Otherwise the
        // point with the minimum angle to the ray wins.
        let stop = m;
        let (mx, my) = (nodes[m].x, nodes[m].y);
        let mut tan_min = f64::INFINITY;

        let mut p = m;
        loop {
            let (px, py) = (nodes[p].x, nodes[p].y);
            if hx >= px
                && px >= mx
                && hx != px
                && point_in_triangle(
                    if hy < my { hx } else { qx },
                    hy,
                    mx,
                    my,
                    if hy < my { qx } else { hx },
                    hy,
                    px,
                    py,
                )
            {
                let tan = (hy - py).abs() / (hx - px);
                if self.locally_inside(p, hole)
                    && (tan < tan_min
                        || (tan == tan_min
                            && (px > nodes[m].x
                                || (px == nodes[m].x && self.sector_contains_sector(m, p)))))
                {
                    m = p;
                    tan_min = tan;
                }
            }

            p = nodes.next(p);
            if p == stop {
                break;
            }
        }

        Some(m)
    }

    /// Whether the sector at vertex `m` contains the sector at vertex `p` of the same vertex.
    fn sector_contains_sector(&self, m: NodeId, p: NodeId) -> bool {
        let nodes = &self.nodes;
        nodes.area(nodes.prev(m), m, nodes.prev(p)) < 0.0
            && nodes.area(nodes.next(p), m, nodes.next(m)) < 0.0
    }

    /// The leftmost node of a ring, lowest y breaking ties.
    fn get_leftmost(&self, start: NodeId) -> NodeId {
        let mut p = start;
        let mut leftmost = start;
        loop {
            let (node, best) = (&self.nodes[p], &self.nodes[leftmost]);
            if node.x < best.x || (node.x == best.x && node.y < best.y) {
                leftmost = p;
            }
            p = node.next;
            if p == start {
                return leftmost;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::earcut::{triangle_area, triangulate};
    use crate::kurbo::Point;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn hole_facing_reflex_vertex() {
        // The outer ring has a notch whose tip is the closest visible vertex to the hole.
        let outer = pts(&[(0., 0.), (8., 0.), (8., 6.), (0., 6.), (0., 4.), (2., 3.), (0., 2.)]);
        let hole = pts(&[(4., 2.), (6., 3.), (4., 4.)]);
        let indices = triangulate(&outer, &[&hole[..]]);

        let all: Vec<Point> = outer.iter().chain(&hole).copied().collect();
        assert!((triangle_area(&all, &indices) - 44.0).abs() < 1e-9);
    }

    #[test]
    fn holes_are_bridged_regardless_of_order() {
        let outer = pts(&[(0., 0.), (12., 0.), (12., 4.), (0., 4.)]);
        let a = pts(&[(1., 1.), (3., 1.), (3., 3.), (1., 3.)]);
        let b = pts(&[(5., 1.), (7., 1.), (7., 3.), (5., 3.)]);
        let c = pts(&[(9., 1.), (11., 1.), (11., 3.), (9., 3.)]);

        for holes in [[&a, &b, &c], [&c, &a, &b], [&b, &c, &a]] {
            let holes: Vec<&[Point]> = holes.iter().map(|h| &h[..]).collect();
            let indices = triangulate(&outer, &holes);
            let all: Vec<Point> = outer
                .iter()
                .chain(holes.iter().flat_map(|h| h.iter()))
                .copied()
                .collect();
            assert!((triangle_area(&all, &indices) - 36.0).abs() < 1e-9);
        }
    }
}
