// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across different tests.

use canvas_cpu::kurbo::{Point, Rect};
use canvas_cpu::peniko::color::Rgba8;
use canvas_cpu::{Pixmap, RenderContext};

pub(crate) const NO_HOLES: &[&[Point]] = &[];

pub(crate) const RED: Rgba8 = rgba(255, 0, 0, 255);
pub(crate) const BLUE: Rgba8 = rgba(0, 0, 255, 255);
pub(crate) const TRANSPARENT: Rgba8 = rgba(0, 0, 0, 0);

pub(crate) const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba8 {
    Rgba8 { r, g, b, a }
}

/// The outline of `rect` as a polygon.
pub(crate) fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    let r = Rect::new(x0, y0, x1, y1);
    [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x1, r.y1),
        Point::new(r.x0, r.y1),
    ]
}

/// The same outline as [`rect`] with the opposite winding.
pub(crate) fn rect_reversed(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    let mut points = rect(x0, y0, x1, y1);
    points.reverse();
    points
}

/// The quad of `rect` in the corner order top-left, bottom-left, bottom-right, top-right.
pub(crate) fn quad(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
    [
        Point::new(x0, y0),
        Point::new(x0, y1),
        Point::new(x1, y1),
        Point::new(x1, y0),
    ]
}

pub(crate) fn get_ctx(width: u16, height: u16) -> RenderContext {
    let mut ctx = RenderContext::new(width, height);
    ctx.set_paint(RED);
    ctx
}

pub(crate) fn fill_rect(ctx: &mut RenderContext, x0: f64, y0: f64, x1: f64, y1: f64) {
    ctx.fill_polygon(&rect(x0, y0, x1, y1), NO_HOLES);
}

pub(crate) fn render_pixmap(ctx: &RenderContext) -> Pixmap {
    let mut pixmap = Pixmap::new(ctx.width(), ctx.height());
    ctx.render_to_pixmap(&mut pixmap).unwrap();
    pixmap
}

/// The positions of all pixels with a non-zero alpha.
pub(crate) fn covered(pixmap: &Pixmap) -> Vec<(u16, u16)> {
    let mut pixels = vec![];
    for y in 0..pixmap.height() {
        for x in 0..pixmap.width() {
            if pixmap.sample(x, y).a != 0 {
                pixels.push((x, y));
            }
        }
    }
    pixels
}

/// Assert that exactly the pixels for which `inside` returns true are covered.
pub(crate) fn assert_coverage(pixmap: &Pixmap, inside: impl Fn(f64, f64) -> bool) {
    for y in 0..pixmap.height() {
        for x in 0..pixmap.width() {
            let expected = inside(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let actual = pixmap.sample(x, y).a != 0;
            assert_eq!(actual, expected, "coverage of pixel ({x}, {y})");
        }
    }
}
