// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte masks, used for clipping, for tracking written pixels and as alpha masks.

/// A mask with one byte of coverage per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Vec<u8>,
    width: u16,
    height: u16,
}

impl Mask {
    /// Create a new mask with every pixel set to `value`.
    pub fn new(width: u16, height: u16, value: u8) -> Self {
        Self {
            data: vec![value; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Create a new mask from the given alpha data.
    ///
    /// The pixels are in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if the `data` vector is not of length `width * height`.
    pub fn from_parts(data: Vec<u8>, width: u16, height: u16) -> Self {
        assert_eq!(
            data.len(),
            usize::from(width) * usize::from(height),
            "Expected `data` to have length of exactly `width * height`"
        );

        Self {
            data,
            width,
            height,
        }
    }

    /// Return the width of the mask.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the mask.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Return the raw data of the mask.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Sample the value at a specific location.
    ///
    /// This function might panic or yield a wrong result if the location
    /// is out-of-bounds.
    #[inline(always)]
    pub fn sample(&self, x: u16, y: u16) -> u8 {
        debug_assert!(
            x < self.width && y < self.height,
            "cannot sample mask outside of its range"
        );

        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Set the value at a specific location.
    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, value: u8) {
        self.data[y as usize * self.width as usize + x as usize] = value;
    }

    /// Keep only the coverage that is also present in `other`.
    ///
    /// # Panics
    ///
    /// Panics if both masks differ in size.
    pub fn intersect(&mut self, other: &Self) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "Expected masks of the same size"
        );
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = (*a).min(b);
        }
    }
}
