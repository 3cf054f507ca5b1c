// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scanline rasterization of triangles and convex quads.
//!
//! A pixel is covered if its center lies inside the shape: rows are sampled at `y + 0.5` and
//! a column is covered when `x + 0.5` falls into the half-open span `[left, right)` of its row.

use core::ops::Range;

use canvas_common::kurbo::{Point, Vec2};
use smallvec::SmallVec;

/// Horizontal spans of one row, sorted and non-overlapping.
pub(crate) type Spans = SmallVec<[(f64, f64); 2]>;

/// The horizontal extent of `tri` on the line at height `y`, ordered `left <= right`.
///
/// Returns `None` if the line does not cross the triangle, that is if `y <= top` or
/// `y > bottom`.
pub fn triangle_span(tri: &[Point; 3], y: f64) -> Option<(f64, f64)> {
    let mut sorted = *tri;
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
    let [top, mid, bottom] = sorted;

    if !(y > top.y && y <= bottom.y) {
        return None;
    }

    let lerp = |a: Point, b: Point| a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);

    // The long edge spans the full height, the short one is whichever straddles `y`.
    let long = lerp(top, bottom);
    let short = if y <= mid.y {
        lerp(top, mid)
    } else {
        lerp(mid, bottom)
    };

    Some(if long < short {
        (long, short)
    } else {
        (short, long)
    })
}

/// Collect the union of the spans of `tris` on the line at height `y`.
pub(crate) fn row_spans(tris: &[[Point; 3]], y: f64, spans: &mut Spans) {
    spans.clear();
    spans.extend(tris.iter().filter_map(|tri| triangle_span(tri, y)));
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged = 0;
    for i in 0..spans.len() {
        let span = spans[i];
        if merged > 0 && span.0 <= spans[merged - 1].1 {
            spans[merged - 1].1 = spans[merged - 1].1.max(span.1);
        } else {
            spans[merged] = span;
            merged += 1;
        }
    }
    spans.truncate(merged);
}

/// The rows `floor(min_y)..=ceil(max_y)` touched by `tris`, clipped to `height`.
pub(crate) fn rows(tris: &[[Point; 3]], height: u16) -> Range<u16> {
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in tris.iter().flatten() {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return 0..0;
        }
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if min_y > max_y {
        return 0..0;
    }

    let start = min_y.floor().clamp(0.0, f64::from(height)) as u16;
    let end = (max_y.ceil() + 1.0).clamp(0.0, f64::from(height)) as u16;
    start..end
}

/// The columns whose centers lie in `[left, right)`, clipped to `width`.
pub(crate) fn columns(left: f64, right: f64, width: u16) -> Range<u16> {
    let left = left.max(0.0);
    let right = right.min(f64::from(width));
    if left >= right {
        return 0..0;
    }

    let start = (left - 0.5).ceil().max(0.0) as u16;
    let end = (right - 0.5).ceil().clamp(0.0, f64::from(width)) as u16;
    start..end.max(start)
}

/// Split a quad into the two triangles sharing the diagonal `q0 q2`.
pub(crate) fn quad_triangles(quad: &[Point; 4]) -> [[Point; 3]; 2] {
    [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]]
}

/// Maps points into the coordinate system spanned by the edges of a quad.
///
/// The quad's first vertex maps to `(0, 0)`, its second vertex (along the `left` edge) to
/// `(0, 1)` and its fourth vertex (along the `top` edge) to `(1, 0)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadBasis {
    origin: Point,
    top: Vec2,
    left: Vec2,
    inv_det: f64,
}

impl QuadBasis {
    /// Create the basis of `quad`.
    pub fn new(quad: &[Point; 4]) -> Self {
        let top = quad[3] - quad[0];
        let left = quad[1] - quad[0];
        let det = top.cross(left);
        let inv_det = if det != 0.0 && det.is_finite() {
            1.0 / det
        } else {
            0.0
        };

        Self {
            origin: quad[0],
            top,
            left,
            inv_det,
        }
    }

    /// The coordinates `(tx, ty)` of `p` in this basis.
    ///
    /// Degenerate quads map every point to `(0, 0)`.
    pub fn map(&self, p: Point) -> (f64, f64) {
        let d = p - self.origin;
        let tx = d.cross(self.left) * self.inv_det;
        let ty = self.top.cross(d) * self.inv_det;
        if tx.is_finite() && ty.is_finite() {
            (tx, ty)
        } else {
            (0.0, 0.0)
        }
    }
}

/// Call `f` for every pixel whose center is covered by the union of `tris`.
///
/// Every pixel is reported at most once.
pub(crate) fn scan(
    tris: &[[Point; 3]],
    width: u16,
    height: u16,
    mut f: impl FnMut(u16, u16),
) {
    let mut spans = Spans::new();
    for y in rows(tris, height) {
        row_spans(tris, f64::from(y) + 0.5, &mut spans);
        for &(left, right) in &spans {
            for x in columns(left, right, width) {
                f(x, y);
            }
        }
    }
}

/// Call `f` for every pixel of a `width` × `height` buffer covered by `tri`.
pub fn fill_triangle(tri: &[Point; 3], width: u16, height: u16, f: impl FnMut(u16, u16)) {
    scan(core::slice::from_ref(tri), width, height, f);
}

/// Call `f` for every pixel covered by the convex `quad`, together with the pixel center's
/// coordinates in the quad's [basis](QuadBasis).
///
/// The two triangles the quad is made of are scanned as one shape, so pixels along their
/// shared diagonal are reported once.
pub fn fill_quad(
    quad: &[Point; 4],
    width: u16,
    height: u16,
    mut f: impl FnMut(u16, u16, f64, f64),
) {
    let basis = QuadBasis::new(quad);
    scan(&quad_triangles(quad), width, height, |x, y| {
        let (tx, ty) = basis.map(Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5));
        f(x, y, tx, ty);
    });
}
