// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simple pixmap type.

use peniko::color::Rgba8;

/// Transparent black.
pub(crate) const TRANSPARENT: Rgba8 = Rgba8 {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

/// A pixmap of straight (not premultiplied) RGBA8 values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    /// Width of the pixmap in pixels.
    width: u16,
    /// Height of the pixmap in pixels.
    height: u16,
    /// Buffer of the pixmap in RGBA8 format.
    buf: Vec<Rgba8>,
}

impl Pixmap {
    /// Create a new pixmap with the given width and height in pixels.
    ///
    /// All pixels are initialized to transparent black.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buf: vec![TRANSPARENT; usize::from(width) * usize::from(height)],
        }
    }

    /// Create a new pixmap with the given RGBA8 data.
    ///
    /// The pixels are in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if the `data` vector is not of length `width * height`.
    pub fn from_parts(data: Vec<Rgba8>, width: u16, height: u16) -> Self {
        assert_eq!(
            data.len(),
            usize::from(width) * usize::from(height),
            "Expected `data` to have length of exactly `width * height`"
        );
        Self {
            width,
            height,
            buf: data,
        }
    }

    /// Return the width of the pixmap.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the pixmap.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgba8) {
        self.buf.fill(color);
    }

    /// Create a pixmap from a PNG file.
    #[cfg(feature = "png")]
    pub fn from_png(data: impl std::io::Read) -> Result<Self, png::DecodingError> {
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(
            png::Transformations::normalize_to_color8() | png::Transformations::ALPHA,
        );

        let mut reader = decoder.read_info()?;
        let mut pixmap = {
            let info = reader.info();
            let width: u16 = info
                .width
                .try_into()
                .map_err(|_| png::DecodingError::LimitsExceeded)?;
            let height: u16 = info
                .height
                .try_into()
                .map_err(|_| png::DecodingError::LimitsExceeded)?;
            Self::new(width, height)
        };

        // `reader.output_color_type()` takes the transformations into account.
        let (color_type, _) = reader.output_color_type();
        match color_type {
            png::ColorType::Rgba => {
                reader.next_frame(pixmap.data_as_u8_slice_mut())?;
            }
            png::ColorType::GrayscaleAlpha => {
                let mut grayscale_data = vec![0; reader.output_buffer_size()];
                reader.next_frame(&mut grayscale_data)?;

                for (gray_alpha, pixel) in grayscale_data.chunks_exact(2).zip(pixmap.data_mut()) {
                    let (gray, alpha) = (gray_alpha[0], gray_alpha[1]);
                    *pixel = Rgba8 {
                        r: gray,
                        g: gray,
                        b: gray,
                        a: alpha,
                    };
                }
            }
            png::ColorType::Rgb | png::ColorType::Grayscale | png::ColorType::Indexed => {
                unreachable!("The transformations always expand to 8-bit color with alpha")
            }
        }

        Ok(pixmap)
    }

    /// Return the current content of the pixmap as a PNG.
    #[cfg(feature = "png")]
    pub fn into_png(self) -> Result<Vec<u8>, png::EncodingError> {
        let mut data = Vec::new();
        let mut encoder = png::Encoder::new(&mut data, self.width.into(), self.height.into());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(self.data_as_u8_slice())?;
        writer.finish().map(|_| data)
    }

    /// Returns a reference to the underlying data.
    ///
    /// The pixels are in row-major order.
    pub fn data(&self) -> &[Rgba8] {
        &self.buf
    }

    /// Returns a mutable reference to the underlying data.
    ///
    /// The pixels are in row-major order.
    pub fn data_mut(&mut self) -> &mut [Rgba8] {
        &mut self.buf
    }

    /// Returns the underlying data as bytes in the order `[r, g, b, a]`.
    pub fn data_as_u8_slice(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buf)
    }

    /// Returns the underlying data as mutable bytes in the order `[r, g, b, a]`.
    pub fn data_as_u8_slice_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.buf)
    }

    /// Sample a pixel from the pixmap.
    #[inline(always)]
    pub fn sample(&self, x: u16, y: u16) -> Rgba8 {
        self.buf[self.width as usize * y as usize + x as usize]
    }

    /// Set a pixel in the pixmap at the given coordinates.
    ///
    /// The origin is the top-left corner, with `x` increasing to the right and `y` increasing
    /// downward.
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u16, y: u16, pixel: Rgba8) {
        let idx = self.width as usize * y as usize + x as usize;
        self.buf[idx] = pixel;
    }
}

#[cfg(test)]
mod tests {
    use super::Pixmap;
    use peniko::color::Rgba8;

    #[test]
    fn set_and_sample() {
        let mut pixmap = Pixmap::new(3, 2);
        let red = Rgba8 {
            r: 255,
            g: 0,
            b: 0,
            a: 255,
        };
        pixmap.set_pixel(2, 1, red);

        assert_eq!(pixmap.sample(2, 1), red);
        assert_eq!(pixmap.data()[5], red);
        assert_eq!(&pixmap.data_as_u8_slice()[20..24], &[255, 0, 0, 255]);
    }

    #[test]
    #[should_panic(expected = "width * height")]
    fn from_parts_checks_length() {
        let _ = Pixmap::from_parts(vec![], 2, 2);
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_round_trip() {
        let mut pixmap = Pixmap::new(4, 3);
        pixmap.set_pixel(
            1,
            2,
            Rgba8 {
                r: 10,
                g: 20,
                b: 30,
                a: 128,
            },
        );

        let png = pixmap.clone().into_png().unwrap();
        let decoded = Pixmap::from_png(&png[..]).unwrap();

        assert_eq!(decoded, pixmap);
    }
}
