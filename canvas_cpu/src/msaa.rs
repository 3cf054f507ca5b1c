// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-sample anti-aliasing on top of the scanline rasterizer.
//!
//! At level `L` every pixel is sampled on an evenly spaced `(L + 1) × (L + 1)` grid. Pixels
//! whose samples are all inside the shape are reported right away. For pixels on an edge,
//! the covered samples are recorded and later resolved into one averaged color per pixel.

use canvas_common::kurbo::Point;
use peniko::color::Rgba8;

use crate::raster::{self, quad_triangles, row_spans, QuadBasis, Spans};

/// The highest supported MSAA level, giving 81 samples per pixel.
pub const MAX_MSAA_LEVEL: u8 = 8;

/// One covered sub-pixel sample of a partially covered pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MsaaSample {
    /// Column of the pixel.
    pub ix: u16,
    /// Row of the pixel.
    pub iy: u16,
    /// Horizontal position of the sample.
    pub fx: f64,
    /// Vertical position of the sample.
    pub fy: f64,
    /// Horizontal position in the quad basis, `0` for triangles.
    pub tx: f64,
    /// Vertical position in the quad basis, `0` for triangles.
    pub ty: f64,
}

/// Collects the samples of partially covered pixels of one fill.
#[derive(Debug, Default)]
pub struct MsaaSampler {
    samples: Vec<MsaaSample>,
    /// Spans of each sub-row of the current row.
    spans: Vec<Spans>,
}

impl MsaaSampler {
    /// Create a new sampler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The samples recorded since the last [`resolve`](Self::resolve).
    pub fn samples(&self) -> &[MsaaSample] {
        &self.samples
    }

    /// Scan `tri`, calling `full` for each fully covered pixel and recording samples for
    /// partially covered ones.
    ///
    /// At level `0` this reports exactly the pixels of [`raster::fill_triangle`].
    pub fn scan_triangle(
        &mut self,
        level: u8,
        tri: &[Point; 3],
        width: u16,
        height: u16,
        mut full: impl FnMut(u16, u16),
    ) {
        self.scan(
            level,
            core::slice::from_ref(tri),
            None,
            width,
            height,
            |x, y, _, _| full(x, y),
        );
    }

    /// Like [`scan_triangle`](Self::scan_triangle), for a convex quad.
    ///
    /// Fully covered pixels and samples carry their position in the quad's basis.
    pub fn scan_quad(
        &mut self,
        level: u8,
        quad: &[Point; 4],
        width: u16,
        height: u16,
        full: impl FnMut(u16, u16, f64, f64),
    ) {
        let basis = QuadBasis::new(quad);
        self.scan(
            level,
            &quad_triangles(quad),
            Some(&basis),
            width,
            height,
            full,
        );
    }

    fn scan(
        &mut self,
        level: u8,
        tris: &[[Point; 3]],
        basis: Option<&QuadBasis>,
        width: u16,
        height: u16,
        mut full: impl FnMut(u16, u16, f64, f64),
    ) {
        let map = |x: f64, y: f64| basis.map_or((0.0, 0.0), |b| b.map(Point::new(x, y)));

        if level == 0 {
            raster::scan(tris, width, height, |x, y| {
                let (tx, ty) = map(f64::from(x) + 0.5, f64::from(y) + 0.5);
                full(x, y, tx, ty);
            });
            return;
        }

        let n = usize::from(level.min(MAX_MSAA_LEVEL)) + 1;
        let step = 1.0 / n as f64;
        let offset = |k: usize| step * 0.5 + k as f64 * step;
        if self.spans.len() < n {
            self.spans.resize_with(n, Spans::new);
        }

        for y in raster::rows(tris, height) {
            let row = f64::from(y);
            let (mut min_left, mut max_right) = (f64::INFINITY, f64::NEG_INFINITY);
            for (k, spans) in self.spans[..n].iter_mut().enumerate() {
                row_spans(tris, row + offset(k), spans);
                for &(left, right) in spans.iter() {
                    min_left = min_left.min(left);
                    max_right = max_right.max(right);
                }
            }
            if min_left >= max_right {
                continue;
            }

            let start = min_left.floor().clamp(0.0, f64::from(width)) as u16;
            let end = max_right.ceil().clamp(0.0, f64::from(width)) as u16;
            for x in start..end {
                let col = f64::from(x);
                let (first, last) = (col + offset(0), col + offset(n - 1));

                let fully_covered = self.spans[..n]
                    .iter()
                    .all(|spans| spans.iter().any(|&(l, r)| l <= first && last < r));
                if fully_covered {
                    let (tx, ty) = map(col + 0.5, row + 0.5);
                    full(x, y, tx, ty);
                    continue;
                }

                for (k, spans) in self.spans[..n].iter().enumerate() {
                    let fy = row + offset(k);
                    for j in 0..n {
                        let fx = col + offset(j);
                        if spans.iter().any(|&(l, r)| l <= fx && fx < r) {
                            let (tx, ty) = map(fx, fy);
                            self.samples.push(MsaaSample {
                                ix: x,
                                iy: y,
                                fx,
                                fy,
                                tx,
                                ty,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Resolve the recorded samples into one color per pixel.
    ///
    /// Duplicate samples (same pixel and position) are dropped. `color` is called once per
    /// remaining sample, the colors of a pixel are averaged over all `(level + 1)²` sample
    /// positions (uncovered ones count as transparent) and handed to `composite` once per
    /// pixel. The sampler is empty afterwards.
    pub fn resolve(
        &mut self,
        level: u8,
        mut color: impl FnMut(&MsaaSample) -> Rgba8,
        mut composite: impl FnMut(u16, u16, Rgba8),
    ) {
        self.samples.sort_by(|a, b| {
            (a.iy, a.ix)
                .cmp(&(b.iy, b.ix))
                .then(a.fy.total_cmp(&b.fy))
                .then(a.fx.total_cmp(&b.fx))
        });
        self.samples
            .dedup_by(|a, b| (a.ix, a.iy) == (b.ix, b.iy) && a.fx == b.fx && a.fy == b.fy);

        let grid = usize::from(level.min(MAX_MSAA_LEVEL)) + 1;
        let count = (grid * grid) as f32;

        let mut start = 0;
        while start < self.samples.len() {
            let pixel = (self.samples[start].ix, self.samples[start].iy);
            let end = start
                + self.samples[start..]
                    .iter()
                    .take_while(|s| (s.ix, s.iy) == pixel)
                    .count();

            let averaged = average(self.samples[start..end].iter().map(&mut color), count);
            composite(pixel.0, pixel.1, averaged);
            start = end;
        }

        self.samples.clear();
    }
}

/// Average colors over `count` samples, missing samples counting as transparent.
///
/// Every channel, alpha included, is summed and divided by `count` with rounding.
pub(crate) fn average(colors: impl Iterator<Item = Rgba8>, count: f32) -> Rgba8 {
    let mut sum = [0.0_f32; 4];
    for c in colors {
        sum[0] += f32::from(c.r);
        sum[1] += f32::from(c.g);
        sum[2] += f32::from(c.b);
        sum[3] += f32::from(c.a);
    }

    let channel = |v: f32| (v / count).round().clamp(0.0, 255.0) as u8;
    Rgba8 {
        r: channel(sum[0]),
        g: channel(sum[1]),
        b: channel(sum[2]),
        a: channel(sum[3]),
    }
}
