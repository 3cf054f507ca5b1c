// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Approximation of a Gaussian blur using three box blurs along each axis.
//!
//! Running three box blurs in series is a cheap and well known approximation of a
//! Gaussian. See Gwosdek, P., Grewenig, S., Bruhn, A., Weickert, J. (2012), Theoretical
//! Foundations of Gaussian Convolution by Extended Box Filtering,
//! <https://www.mia.uni-saarland.de/Publications/gwosdek-ssvm11.pdf>.
//!
//! Near the image borders the window shrinks instead of wrapping or padding, so every output
//! pixel is the mean of the pixels actually inside its window.

use peniko::color::Rgba8;

use crate::pixmap::Pixmap;

/// The pixel type all passes operate on: premultiplied RGBA in `0.0..=255.0`.
pub type NaivePremulPixel = [f32; 4];

/// The three box radii approximating a Gaussian blur of `radius`.
///
/// With `a = floor(radius)`, the radii are `a`, `a + 1` if the fractional part exceeds
/// `1/3` and `a + 1` if it exceeds `2/3`. Returns `None` if the blur would be the identity.
pub fn box_radii(radius: f64) -> Option<[usize; 3]> {
    if !(radius > 0.0) {
        return None;
    }
    let a = radius.floor();
    let frac = radius - a;
    let a = a.min(f64::from(u32::MAX)) as usize;
    let radii = [
        a,
        a + usize::from(frac > 1.0 / 3.0),
        a + usize::from(frac > 2.0 / 3.0),
    ];
    (radii != [0; 3]).then_some(radii)
}

/// A reusable box blur filter.
#[derive(Debug, Default)]
pub struct BoxBlur {
    a: Vec<NaivePremulPixel>,
    b: Vec<NaivePremulPixel>,
    prefix: Vec<[f64; 4]>,
}

impl BoxBlur {
    /// Create a new filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blur `pixmap` in place.
    pub fn blur(&mut self, pixmap: &mut Pixmap, radius: f64) {
        if box_radii(radius).is_none() {
            return;
        }

        let mut pixels = core::mem::take(&mut self.a);
        pixels.clear();
        pixels.extend(pixmap.data().iter().map(|&c| premultiply(c)));

        self.blur_premul(&mut pixels, pixmap.width(), pixmap.height(), radius);

        for (dst, src) in pixmap.data_mut().iter_mut().zip(&pixels) {
            *dst = unpremultiply(*src);
        }
        self.a = pixels;
    }

    /// Blur a `width` × `height` image of premultiplied pixels in place.
    ///
    /// Three horizontal passes are followed by three vertical passes. Values are kept as
    /// floats in between, so rounding only happens once when converting back.
    ///
    /// # Panics
    ///
    /// Panics if `image` is not of length `width * height`.
    pub fn blur_premul(
        &mut self,
        image: &mut [NaivePremulPixel],
        width: u16,
        height: u16,
        radius: f64,
    ) {
        let (width, height) = (usize::from(width), usize::from(height));
        assert_eq!(
            image.len(),
            width * height,
            "Expected `image` to have length of exactly `width * height`"
        );
        let Some(radii) = box_radii(radius) else {
            return;
        };
        if image.is_empty() {
            return;
        }

        let mut scratch = core::mem::take(&mut self.b);
        scratch.clear();
        scratch.resize(image.len(), [0.0; 4]);

        self.blur_rows(radii, image, &mut scratch, width);

        // Transposing into column-major makes the vertical passes run over contiguous rows.
        transpose(&scratch, image, width, height);
        self.blur_rows(radii, image, &mut scratch, height);
        transpose(&scratch, image, height, width);

        self.b = scratch;
    }

    /// Apply the three box passes to every row of length `len` of `image`, leaving the
    /// result in `out`.
    fn blur_rows(
        &mut self,
        radii: [usize; 3],
        image: &mut [NaivePremulPixel],
        out: &mut [NaivePremulPixel],
        len: usize,
    ) {
        for (row, out_row) in image.chunks_exact_mut(len).zip(out.chunks_exact_mut(len)) {
            box_blur_row(radii[0], row, out_row, &mut self.prefix);
            box_blur_row(radii[1], out_row, row, &mut self.prefix);
            box_blur_row(radii[2], row, out_row, &mut self.prefix);
        }
    }
}

/// One sliding-window mean over `input`, written to `output`.
///
/// The window covers `radius` pixels on either side and is cut off at both ends of the row.
pub fn box_blur_row(
    radius: usize,
    input: &[NaivePremulPixel],
    output: &mut [NaivePremulPixel],
    prefix: &mut Vec<[f64; 4]>,
) {
    let len = input.len();
    debug_assert_eq!(len, output.len(), "rows must have the same length");

    if radius == 0 {
        output.copy_from_slice(input);
        return;
    }

    // Prefix sums keep regions outside the blurred area at exactly zero.
    prefix.clear();
    let mut acc = [0.0_f64; 4];
    prefix.push(acc);
    for px in input {
        for (a, &c) in acc.iter_mut().zip(px) {
            *a += f64::from(c);
        }
        prefix.push(acc);
    }

    for (i, out) in output.iter_mut().enumerate() {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius + 1).min(len);
        let count = (hi - lo) as f64;
        for (c, (h, l)) in out.iter_mut().zip(prefix[hi].iter().zip(&prefix[lo])) {
            *c = ((h - l) / count) as f32;
        }
    }
}

/// Write the `rows` × `cols` row-major `src` into `dst` as `cols` × `rows`.
fn transpose(src: &[NaivePremulPixel], dst: &mut [NaivePremulPixel], cols: usize, rows: usize) {
    for (y, row) in src.chunks_exact(cols).enumerate().take(rows) {
        for (x, &px) in row.iter().enumerate() {
            dst[x * rows + y] = px;
        }
    }
}

fn premultiply(c: Rgba8) -> NaivePremulPixel {
    let alpha = f32::from(c.a) / 255.0;
    [
        f32::from(c.r) * alpha,
        f32::from(c.g) * alpha,
        f32::from(c.b) * alpha,
        f32::from(c.a),
    ]
}

fn unpremultiply(p: NaivePremulPixel) -> Rgba8 {
    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    let a = to_u8(p[3]);
    if a == 0 {
        return crate::pixmap::TRANSPARENT;
    }
    let scale = 255.0 / p[3];
    Rgba8 {
        r: to_u8(p[0] * scale),
        g: to_u8(p[1] * scale),
        b: to_u8(p[2] * scale),
        a,
    }
}

#[cfg(test)]
mod tests {
    use super::{box_blur_row, box_radii, BoxBlur, NaivePremulPixel};
    use crate::pixmap::Pixmap;
    use peniko::color::Rgba8;

    #[test]
    fn radii_split() {
        assert_eq!(box_radii(0.0), None);
        assert_eq!(box_radii(-2.0), None);
        assert_eq!(box_radii(f64::NAN), None);
        assert_eq!(box_radii(0.2), None);
        assert_eq!(box_radii(0.5), Some([0, 1, 0]));
        assert_eq!(box_radii(2.0), Some([2, 2, 2]));
        assert_eq!(box_radii(2.8), Some([2, 3, 3]));
    }

    #[test]
    fn row_window_shrinks_at_edges() {
        let input: Vec<NaivePremulPixel> = [3.0, 0.0, 0.0, 6.0].map(|v| [v; 4]).to_vec();
        let mut output = vec![[0.0; 4]; 4];
        box_blur_row(1, &input, &mut output, &mut vec![]);

        let values: Vec<f32> = output.iter().map(|p| p[0]).collect();
        assert_eq!(values, vec![1.5, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn wide_window_averages_whole_row() {
        let input: Vec<NaivePremulPixel> = [1.0, 2.0, 3.0, 6.0].map(|v| [v; 4]).to_vec();
        let mut output = vec![[0.0; 4]; 4];
        box_blur_row(10, &input, &mut output, &mut vec![]);

        assert!(output.iter().all(|p| p[0] == 3.0));
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let color = Rgba8 {
            r: 40,
            g: 80,
            b: 120,
            a: 255,
        };
        let mut pixmap = Pixmap::new(7, 5);
        pixmap.fill(color);

        BoxBlur::new().blur(&mut pixmap, 2.5);

        assert!(pixmap.data().iter().all(|&c| c == color));
    }

    #[test]
    fn non_square_image_keeps_layout() {
        let mut pixmap = Pixmap::new(9, 3);
        let white = Rgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        };
        pixmap.set_pixel(0, 0, white);

        BoxBlur::new().blur(&mut pixmap, 1.0);

        // The influence stays in the top left corner.
        assert!(pixmap.sample(3, 0).a > 0);
        assert_eq!(pixmap.sample(8, 2).a, 0);
        assert_eq!(pixmap.sample(4, 0).a, 0);
    }
}
