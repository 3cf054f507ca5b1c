// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for basic functionality.

use crate::util::{
    assert_coverage, covered, fill_rect, get_ctx, rect, rect_reversed, render_pixmap, rgba,
    NO_HOLES, RED, TRANSPARENT,
};
use canvas_cpu::kurbo::{Affine, Point, Vec2};
use canvas_cpu::peniko::color::Rgba8;
use canvas_cpu::{Error, Paint, PaintSource, Pixmap, RenderContext, Shadow};
use std::sync::Arc;

#[test]
fn empty_context_is_transparent() {
    let ctx = RenderContext::new(8, 8);

    assert!(covered(ctx.pixmap()).is_empty());
    assert_eq!(ctx.width(), 8);
    assert_eq!(ctx.height(), 8);
}

#[test]
fn default_paint_is_black() {
    let mut ctx = RenderContext::new(8, 8);
    fill_rect(&mut ctx, 0.0, 0.0, 8.0, 8.0);

    assert!(ctx.pixmap().data().iter().all(|&c| c == rgba(0, 0, 0, 255)));
}

#[test]
fn rect_covers_pixel_centers() {
    let mut ctx = get_ctx(20, 20);
    fill_rect(&mut ctx, 2.3, 3.7, 10.2, 8.6);

    assert_coverage(ctx.pixmap(), |x, y| {
        (2.3..10.2).contains(&x) && y > 3.7 && y <= 8.6
    });
    assert_eq!(covered(ctx.pixmap()).len(), 8 * 5);
    assert_eq!(ctx.pixmap().sample(5, 5), RED);
}

#[test]
fn winding_does_not_matter() {
    let mut a = get_ctx(16, 16);
    a.fill_polygon(&rect(1.2, 2.1, 13.7, 11.4), NO_HOLES);
    let mut b = get_ctx(16, 16);
    b.fill_polygon(&rect_reversed(1.2, 2.1, 13.7, 11.4), NO_HOLES);

    assert_eq!(a.pixmap(), b.pixmap());
}

#[test]
fn filled_triangle() {
    let mut ctx = get_ctx(20, 20);
    let tri = [(1.3, 1.2), (18.7, 9.9), (1.3, 18.6)].map(Point::from);
    ctx.fill_polygon(&tri, NO_HOLES);

    // Left edge at x = 1.3, the others meet at (18.7, 9.9).
    assert_eq!(ctx.pixmap().sample(2, 10), RED);
    assert_eq!(ctx.pixmap().sample(17, 9), RED);
    assert_eq!(ctx.pixmap().sample(0, 10), TRANSPARENT);
    assert_eq!(ctx.pixmap().sample(17, 2), TRANSPARENT);
    assert_eq!(ctx.pixmap().sample(19, 10), TRANSPARENT);
}

#[test]
fn polygon_with_hole() {
    let mut ctx = get_ctx(20, 20);
    let hole = rect_reversed(6.2, 6.2, 13.8, 13.8);
    ctx.fill_polygon(&rect(2.2, 2.2, 17.8, 17.8), &[&hole[..]]);

    let inside = |v: f64, lo: f64, hi: f64| v > lo && v < hi;
    assert_coverage(ctx.pixmap(), |x, y| {
        let in_outer = inside(x, 2.2, 17.8) && inside(y, 2.2, 17.8);
        let in_hole = inside(x, 6.2, 13.8) && inside(y, 6.2, 13.8);
        in_outer && !in_hole
    });
}

#[test]
fn glyph_contours_are_classified() {
    let mut ctx = get_ctx(20, 20);
    // An "O" with both contours wound the same way, as some fonts do.
    let outer = rect(2.2, 2.2, 17.8, 17.8);
    let inner = rect(6.2, 6.2, 13.8, 13.8);
    ctx.fill_glyph(&[&outer[..], &inner[..]]);

    assert_eq!(ctx.pixmap().sample(4, 4), RED);
    assert_eq!(ctx.pixmap().sample(10, 4), RED);
    assert_eq!(ctx.pixmap().sample(10, 10), TRANSPARENT);
    assert_eq!(ctx.pixmap().sample(0, 0), TRANSPARENT);

    let mut hole_first = get_ctx(20, 20);
    hole_first.fill_glyph(&[&inner[..], &outer[..]]);
    assert_eq!(hole_first.pixmap(), ctx.pixmap());
}

#[test]
fn glyph_with_two_outlines() {
    let mut ctx = get_ctx(20, 10);
    let left = rect(1.2, 1.2, 8.8, 8.8);
    let right = rect(11.2, 1.2, 18.8, 8.8);
    ctx.fill_glyph(&[left, right]);

    assert_eq!(ctx.pixmap().sample(5, 5), RED);
    assert_eq!(ctx.pixmap().sample(15, 5), RED);
    assert_eq!(ctx.pixmap().sample(10, 5), TRANSPARENT);
}

#[test]
fn transform_is_applied() {
    let mut ctx = get_ctx(16, 16);
    ctx.set_transform(Affine::translate((5.0, 5.0)));
    fill_rect(&mut ctx, 0.2, 0.2, 3.3, 3.3);

    let expected: Vec<(u16, u16)> = (5..8).flat_map(|y| (5..8).map(move |x| (x, y))).collect();
    assert_eq!(covered(ctx.pixmap()), expected);

    ctx.reset();
    ctx.reset_transform();
    fill_rect(&mut ctx, 0.2, 0.2, 3.3, 3.3);
    assert_eq!(covered(ctx.pixmap()).len(), 9);
    assert_eq!(ctx.pixmap().sample(0, 0), RED);
}

#[test]
fn overlapping_triangles_composite_once() {
    let color = rgba(255, 0, 0, 128);
    let tri = [(1.1, 1.1), (14.9, 1.1), (1.1, 14.9)].map(Point::from);
    let twice: Vec<Point> = tri.iter().chain(&tri).copied().collect();

    let mut once = get_ctx(16, 16);
    once.set_paint(color);
    once.fill_triangles(&tri);

    let mut ctx = get_ctx(16, 16);
    ctx.set_paint(color);
    ctx.fill_triangles(&twice);

    assert_eq!(ctx.pixmap(), once.pixmap());
    let first = ctx.pixmap().sample(2, 2);
    assert!(first.a > 0 && first.a < 255);
    assert!(covered(ctx.pixmap())
        .iter()
        .all(|&(x, y)| ctx.pixmap().sample(x, y) == first));
}

#[test]
fn successive_fills_blend() {
    let mut ctx = get_ctx(4, 4);
    ctx.set_paint(rgba(0, 0, 255, 128));
    fill_rect(&mut ctx, 0.0, 0.0, 4.0, 4.0);
    let once = ctx.pixmap().sample(1, 1);
    fill_rect(&mut ctx, 0.0, 0.0, 4.0, 4.0);
    let twice = ctx.pixmap().sample(1, 1);

    assert!(twice.a > once.a);
}

#[test]
fn incomplete_triangle_is_ignored() {
    let points = [(1.1, 1.1), (6.9, 1.1), (1.1, 6.9), (7.9, 7.9)].map(Point::from);

    let mut ctx = get_ctx(8, 8);
    ctx.fill_triangles(&points);
    let mut expected = get_ctx(8, 8);
    expected.fill_triangles(&points[..3]);

    assert_eq!(ctx.pixmap(), expected.pixmap());
    assert!(!covered(ctx.pixmap()).is_empty());
}

#[test]
fn degenerate_polygons_draw_nothing() {
    let mut ctx = get_ctx(8, 8);
    ctx.fill_polygon(&[Point::new(1.0, 1.0), Point::new(5.0, 5.0)], NO_HOLES);
    ctx.fill_polygon(
        &[(1.0, 1.0), (3.0, 3.0), (6.0, 6.0)].map(Point::from),
        NO_HOLES,
    );
    ctx.fill_polygon(
        &[(1.0, 1.0), (f64::NAN, 3.0), (1.0, 6.0)].map(Point::from),
        NO_HOLES,
    );
    ctx.fill_polygon(&rect(20.0, 20.0, 30.0, 30.0), NO_HOLES);

    assert!(covered(ctx.pixmap()).is_empty());
}

#[test]
fn shapes_are_clipped_to_the_pixmap() {
    let mut ctx = get_ctx(8, 8);
    fill_rect(&mut ctx, -10.0, -10.0, 4.0, 100.0);

    assert_coverage(ctx.pixmap(), |x, _| x < 4.0);
}

#[derive(Debug)]
struct HorizontalRamp;

impl PaintSource for HorizontalRamp {
    fn color_at(&self, x: f64, _: f64) -> Rgba8 {
        rgba((x * 16.0) as u8, 0, 0, 255)
    }
}

#[test]
fn custom_paint_is_sampled_at_pixel_centers() {
    let mut ctx = get_ctx(8, 2);
    ctx.set_paint(Paint::Custom(Arc::new(HorizontalRamp)));
    fill_rect(&mut ctx, 0.0, 0.0, 8.0, 2.0);

    for x in 0..8 {
        assert_eq!(ctx.pixmap().sample(x, 1).r, (x * 16 + 8) as u8);
    }
}

#[test]
fn sharp_shadow_is_offset() {
    let mut ctx = get_ctx(20, 10);
    ctx.set_shadow(Some(Shadow {
        color: rgba(0, 0, 0, 255),
        offset: Vec2::new(5.0, 0.0),
        blur: 0.0,
    }));
    fill_rect(&mut ctx, 2.2, 2.2, 6.3, 6.3);

    assert_eq!(ctx.pixmap().sample(3, 4), RED);
    assert_eq!(ctx.pixmap().sample(6, 4), TRANSPARENT);
    assert_eq!(ctx.pixmap().sample(8, 4), rgba(0, 0, 0, 255));
    assert_eq!(ctx.pixmap().sample(11, 4), TRANSPARENT);
}

#[test]
fn invisible_shadow_is_skipped() {
    let mut plain = get_ctx(20, 10);
    fill_rect(&mut plain, 2.2, 2.2, 6.3, 6.3);

    for shadow in [
        Shadow {
            color: rgba(0, 0, 0, 0),
            offset: Vec2::new(5.0, 0.0),
            blur: 2.0,
        },
        Shadow {
            color: rgba(0, 0, 0, 255),
            offset: Vec2::ZERO,
            blur: 0.0,
        },
    ] {
        let mut ctx = get_ctx(20, 10);
        ctx.set_shadow(Some(shadow));
        fill_rect(&mut ctx, 2.2, 2.2, 6.3, 6.3);
        assert_eq!(ctx.pixmap(), plain.pixmap());
    }
}

#[test]
fn render_to_pixmap_copies_content() {
    let mut ctx = get_ctx(6, 4);
    fill_rect(&mut ctx, 1.0, 1.0, 3.0, 3.0);

    assert_eq!(&render_pixmap(&ctx), ctx.pixmap());

    let mut wrong = Pixmap::new(4, 6);
    assert_eq!(
        ctx.render_to_pixmap(&mut wrong),
        Err(Error::InvalidSize {
            width: 4,
            height: 6
        })
    );
}

#[test]
fn reset_keeps_paint() {
    let mut ctx = get_ctx(4, 4);
    fill_rect(&mut ctx, 0.0, 0.0, 4.0, 4.0);
    ctx.reset();
    assert!(covered(ctx.pixmap()).is_empty());

    fill_rect(&mut ctx, 0.0, 0.0, 4.0, 4.0);
    assert_eq!(ctx.pixmap().sample(0, 0), RED);
}
