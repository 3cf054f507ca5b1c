// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic render operations.

use core::ops::Range;

use canvas_common::kurbo::{Affine, Point, Rect, Vec2};
use canvas_common::Earcut;
use log::warn;
use peniko::color::palette::css::BLACK;
use peniko::color::Rgba8;
use smallvec::SmallVec;

use crate::blur::BoxBlur;
use crate::compose::Compositor;
use crate::error::Error;
use crate::mask::Mask;
use crate::msaa::{MsaaSampler, MAX_MSAA_LEVEL};
use crate::paint::Paint;
use crate::pixmap::{Pixmap, TRANSPARENT};
use crate::raster;

/// Settings that apply to a whole render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSettings {
    /// The MSAA level, `0` disables anti-aliasing.
    ///
    /// Each pixel is sampled on a `(msaa_level + 1)²` grid.
    pub msaa_level: u8,
}

impl RenderSettings {
    fn validate(self) -> Result<Self, Error> {
        if self.msaa_level > MAX_MSAA_LEVEL {
            return Err(Error::MsaaLevelTooHigh {
                level: self.msaa_level,
                max: MAX_MSAA_LEVEL,
            });
        }
        Ok(self)
    }
}

/// A drop shadow drawn below every filled shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// The color of the shadow.
    pub color: Rgba8,
    /// The offset of the shadow in device pixels.
    pub offset: Vec2,
    /// The blur radius of the shadow, `0` for a sharp shadow.
    pub blur: f64,
}

impl Shadow {
    fn is_visible(&self) -> bool {
        self.color.a != 0 && (self.offset != Vec2::ZERO || self.blur > 0.0)
    }

    /// The box blur radius used for the shadow's blur.
    fn blur_radius(&self) -> f64 {
        self.blur * (1.0 - 1.0 / (self.blur + 1.0))
    }
}

/// A render context.
#[derive(Debug)]
pub struct RenderContext {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) pixmap: Pixmap,
    /// Pixels outside the clip have a value of `0`.
    pub(crate) clip: Mask,
    /// Pixels touched by the current operation.
    pub(crate) written: Mask,
    pub(crate) paint: Paint,
    pub(crate) transform: Affine,
    pub(crate) settings: RenderSettings,
    pub(crate) shadow: Option<Shadow>,
    earcut: Earcut,
    sampler: MsaaSampler,
    blur: BoxBlur,
    /// Transformed vertices of the current shape.
    vertices: Vec<Point>,
    /// Ranges of `vertices` making up the contours of the current shape.
    contours: Vec<Range<usize>>,
    indices: Vec<u32>,
    /// Device space triangle list of the current shape.
    triangles: Vec<Point>,
    /// Offscreen target for blurred fills.
    layer: Pixmap,
    /// A clip mask without any clipping, for drawing into `layer`.
    layer_clip: Mask,
}

impl RenderContext {
    /// Create a new render context with the given width and height in pixels.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_settings(width, height, RenderSettings::default())
    }

    /// Create a new render context with custom settings.
    pub fn new_with(width: u16, height: u16, settings: RenderSettings) -> Result<Self, Error> {
        Ok(Self::with_settings(width, height, settings.validate()?))
    }

    fn with_settings(width: u16, height: u16, settings: RenderSettings) -> Self {
        Self {
            width,
            height,
            pixmap: Pixmap::new(width, height),
            clip: Mask::new(width, height, 255),
            written: Mask::new(width, height, 0),
            paint: BLACK.to_rgba8().into(),
            transform: Affine::IDENTITY,
            settings,
            shadow: None,
            earcut: Earcut::new(),
            sampler: MsaaSampler::new(),
            blur: BoxBlur::new(),
            vertices: vec![],
            contours: vec![],
            indices: vec![],
            triangles: vec![],
            layer: Pixmap::new(width, height),
            layer_clip: Mask::new(width, height, 255),
        }
    }

    /// Set the current paint.
    pub fn set_paint(&mut self, paint: impl Into<Paint>) {
        self.paint = paint.into();
    }

    /// Set the current transform.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    /// Reset the current transform.
    pub fn reset_transform(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    /// Set the shadow drawn below filled shapes, or `None` to disable shadows.
    pub fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }

    /// Set the MSAA level, `0` disables anti-aliasing.
    pub fn set_msaa_level(&mut self, level: u8) -> Result<(), Error> {
        self.settings = RenderSettings { msaa_level: level }.validate()?;
        Ok(())
    }

    /// The current settings.
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    /// Fill a polygon with holes using the current paint.
    ///
    /// Contours are implicitly closed and are transformed by the current transform.
    pub fn fill_polygon<H: AsRef<[Point]>>(&mut self, outer: &[Point], holes: &[H]) {
        self.triangulate_polygon(outer, holes);
        self.draw_shadow();
        self.draw_triangles(Vec2::ZERO);
    }

    /// Fill a glyph given as contours without outer/hole tagging, using the current paint.
    pub fn fill_glyph<C: AsRef<[Point]>>(&mut self, contours: &[C]) {
        self.load_contours(contours.iter().map(|c| c.as_ref()));
        {
            let slices: SmallVec<[&[Point]; 8]> = self
                .contours
                .iter()
                .map(|range| &self.vertices[range.clone()])
                .collect();
            self.earcut.triangulate_contours(&slices[..], &mut self.indices);
        }
        self.collect_triangles();

        self.draw_shadow();
        self.draw_triangles(Vec2::ZERO);
    }

    /// Fill a triangle list, each consecutive three points forming one triangle.
    pub fn fill_triangles(&mut self, points: &[Point]) {
        if points.len() % 3 != 0 {
            warn!(
                "triangle list of length {} is not a multiple of 3, ignoring the rest",
                points.len()
            );
        }
        let transform = self.transform;
        let len = points.len() - points.len() % 3;
        self.triangles.clear();
        self.triangles.extend(points[..len].iter().map(|&p| transform * p));

        self.draw_shadow();
        self.draw_triangles(Vec2::ZERO);
    }

    /// Fill a polygon into an offscreen layer, blur it with `radius` and draw it.
    pub fn fill_blurred_polygon<H: AsRef<[Point]>>(
        &mut self,
        outer: &[Point],
        holes: &[H],
        radius: f64,
    ) {
        self.triangulate_polygon(outer, holes);
        let paint = self.paint.clone();
        self.draw_blurred(Vec2::ZERO, &paint, radius);
    }

    /// Make the pixels of `rect` transparent, honouring the clip.
    pub fn clear_rect(&mut self, rect: Rect) {
        let transform = self.transform;
        let quad = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x1, rect.y0),
        ]
        .map(|p| transform * p);

        let mut compositor = Compositor::new(&mut self.pixmap, &self.clip, &mut self.written);
        raster::fill_quad(&quad, self.width, self.height, |x, y, _, _| {
            compositor.replace(x, y, TRANSPARENT);
        });
    }

    /// Intersect the clip with a polygon.
    pub fn clip_polygon<H: AsRef<[Point]>>(&mut self, outer: &[Point], holes: &[H]) {
        self.triangulate_polygon(outer, holes);

        self.written.fill(0);
        for tri in self.triangles.chunks_exact(3) {
            let tri = [tri[0], tri[1], tri[2]];
            raster::fill_triangle(&tri, self.width, self.height, |x, y| {
                self.written.set(x, y, 255);
            });
        }
        self.clip.intersect(&self.written);
    }

    /// Remove all clipping.
    pub fn reset_clip(&mut self) {
        self.clip.fill(255);
    }

    /// Draw the part `src` of `image` into `quad`, using nearest-neighbour sampling.
    ///
    /// The corners of `src` are mapped to the corners of `quad` in the order top-left,
    /// bottom-left, bottom-right, top-right.
    pub fn draw_image(&mut self, image: &Pixmap, src: Rect, quad: [Point; 4]) {
        self.fill_quad_with(quad, |_, _, tx, ty| {
            sample_nearest(image, src.x0 + src.width() * tx, src.y0 + src.height() * ty)
        });
    }

    /// Fill `quad` with the current paint, its opacity modulated by `mask`.
    ///
    /// The mask is stretched over the quad like an image in [`draw_image`](Self::draw_image).
    pub fn fill_image_mask(&mut self, mask: &Mask, quad: [Point; 4]) {
        let paint = self.paint.clone();
        let (mw, mh) = (f64::from(mask.width()), f64::from(mask.height()));
        self.fill_quad_with(quad, |x, y, tx, ty| {
            let (mx, my) = ((mw * tx).floor(), (mh * ty).floor());
            if !(0.0..mw).contains(&mx) || !(0.0..mh).contains(&my) {
                return TRANSPARENT;
            }
            let coverage = mask.sample(mx as u16, my as u16);
            let mut color = paint.color_at(x, y);
            color.a = ((u16::from(color.a) * u16::from(coverage) + 127) / 255) as u8;
            color
        });
    }

    /// Reset the render context: clear the pixmap and remove all clipping.
    ///
    /// The paint, transform, shadow and settings are kept.
    pub fn reset(&mut self) {
        self.pixmap.fill(TRANSPARENT);
        self.clip.fill(255);
    }

    /// The pixmap drawn into.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Copy the rendered content into `pixmap`.
    pub fn render_to_pixmap(&self, pixmap: &mut Pixmap) -> Result<(), Error> {
        if (pixmap.width(), pixmap.height()) != (self.width, self.height) {
            return Err(Error::InvalidSize {
                width: pixmap.width(),
                height: pixmap.height(),
            });
        }
        pixmap.data_mut().copy_from_slice(self.pixmap.data());
        Ok(())
    }

    /// Return the width of the pixmap.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the pixmap.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Transform `contours` into `vertices`, recording their ranges.
    fn load_contours<'a>(&mut self, contours: impl Iterator<Item = &'a [Point]>) {
        let transform = self.transform;
        self.vertices.clear();
        self.contours.clear();
        for contour in contours {
            let start = self.vertices.len();
            self.vertices.extend(contour.iter().map(|&p| transform * p));
            self.contours.push(start..self.vertices.len());
        }
    }

    fn triangulate_polygon<H: AsRef<[Point]>>(&mut self, outer: &[Point], holes: &[H]) {
        self.load_contours(core::iter::once(outer).chain(holes.iter().map(|h| h.as_ref())));
        {
            let holes: SmallVec<[&[Point]; 4]> = self.contours[1..]
                .iter()
                .map(|range| &self.vertices[range.clone()])
                .collect();
            self.earcut.triangulate(
                &self.vertices[self.contours[0].clone()],
                &holes[..],
                &mut self.indices,
            );
        }
        self.collect_triangles();
    }

    /// Resolve `indices` into the device space triangle list.
    fn collect_triangles(&mut self) {
        self.triangles.clear();
        self.triangles
            .extend(self.indices.iter().map(|&i| self.vertices[i as usize]));
    }

    fn draw_shadow(&mut self) {
        let Some(shadow) = self.shadow.filter(Shadow::is_visible) else {
            return;
        };
        let paint = Paint::Solid(shadow.color);
        if shadow.blur > 0.0 {
            self.draw_blurred(shadow.offset, &paint, shadow.blur_radius());
        } else {
            let mut compositor =
                Compositor::new(&mut self.pixmap, &self.clip, &mut self.written);
            fill_triangles(
                &self.triangles,
                shadow.offset,
                &paint,
                self.settings.msaa_level,
                &mut self.sampler,
                &mut compositor,
                (self.width, self.height),
            );
        }
    }

    /// Fill the current triangle list with the current paint.
    fn draw_triangles(&mut self, offset: Vec2) {
        let mut compositor = Compositor::new(&mut self.pixmap, &self.clip, &mut self.written);
        fill_triangles(
            &self.triangles,
            offset,
            &self.paint,
            self.settings.msaa_level,
            &mut self.sampler,
            &mut compositor,
            (self.width, self.height),
        );
    }

    /// Fill the current triangle list into the offscreen layer, blur it and draw it.
    fn draw_blurred(&mut self, offset: Vec2, paint: &Paint, radius: f64) {
        self.layer.fill(TRANSPARENT);
        {
            let mut compositor =
                Compositor::new(&mut self.layer, &self.layer_clip, &mut self.written);
            fill_triangles(
                &self.triangles,
                offset,
                paint,
                self.settings.msaa_level,
                &mut self.sampler,
                &mut compositor,
                (self.width, self.height),
            );
        }

        self.blur.blur(&mut self.layer, radius);

        let mut compositor = Compositor::new(&mut self.pixmap, &self.clip, &mut self.written);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = self.layer.sample(x, y);
                if color.a != 0 {
                    compositor.composite(x, y, color);
                }
            }
        }
    }

    /// Fill `quad` (in user space) with colors computed from the pixel position and the
    /// position in the quad.
    fn fill_quad_with(&mut self, quad: [Point; 4], color: impl Fn(f64, f64, f64, f64) -> Rgba8) {
        let transform = self.transform;
        let quad = quad.map(|p| transform * p);
        let level = self.settings.msaa_level;

        let mut compositor = Compositor::new(&mut self.pixmap, &self.clip, &mut self.written);
        self.sampler
            .scan_quad(level, &quad, self.width, self.height, |x, y, tx, ty| {
                let c = color(f64::from(x) + 0.5, f64::from(y) + 0.5, tx, ty);
                compositor.composite(x, y, c);
            });
        self.sampler.resolve(
            level,
            |s| color(s.fx, s.fy, s.tx, s.ty),
            |x, y, c| {
                compositor.composite(x, y, c);
            },
        );
    }
}

/// Fill a device space triangle list, moved by `offset`, with `paint`.
fn fill_triangles(
    triangles: &[Point],
    offset: Vec2,
    paint: &Paint,
    level: u8,
    sampler: &mut MsaaSampler,
    compositor: &mut Compositor<'_>,
    (width, height): (u16, u16),
) {
    for tri in triangles.chunks_exact(3) {
        let tri = [tri[0] + offset, tri[1] + offset, tri[2] + offset];
        sampler.scan_triangle(level, &tri, width, height, |x, y| {
            compositor.composite(x, y, paint.color_at(f64::from(x) + 0.5, f64::from(y) + 0.5));
        });
    }
    sampler.resolve(
        level,
        |s| paint.color_at(s.fx, s.fy),
        |x, y, c| {
            compositor.composite(x, y, c);
        },
    );
}

/// The pixel of `image` containing `x`, `y`, or transparent outside the image.
fn sample_nearest(image: &Pixmap, x: f64, y: f64) -> Rgba8 {
    let (x, y) = (x.floor(), y.floor());
    if x >= 0.0 && y >= 0.0 && x < f64::from(image.width()) && y < f64::from(image.height()) {
        image.sample(x as u16, y as u16)
    } else {
        TRANSPARENT
    }
}
