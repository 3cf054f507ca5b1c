// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Writing colors into a pixmap.

use peniko::color::Rgba8;

use crate::mask::Mask;
use crate::pixmap::Pixmap;

/// Blend the straight-alpha color `src` over `dst`.
///
/// Color channels are interpolated by the source alpha. The resulting alpha never drops
/// below the destination alpha.
pub fn mix(src: Rgba8, dst: Rgba8) -> Rgba8 {
    let sa = f64::from(src.a) / 255.0;
    let da = f64::from(dst.a) / 255.0;

    let channel = |s: u8, d: u8| {
        let (s, d) = (f64::from(s) / 255.0, f64::from(d) / 255.0);
        to_u8((s - d) * sa + d)
    };

    Rgba8 {
        r: channel(src.r, dst.r),
        g: channel(src.g, dst.g),
        b: channel(src.b, dst.b),
        a: to_u8(((sa - da) * sa + da).max(da)),
    }
}

#[inline(always)]
fn to_u8(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Composites the pixels of one drawing operation.
///
/// Pixels outside the clip mask are left alone, and every pixel is written at most once
/// during the lifetime of a compositor.
#[derive(Debug)]
pub struct Compositor<'a> {
    pixmap: &'a mut Pixmap,
    clip: &'a Mask,
    written: &'a mut Mask,
}

impl<'a> Compositor<'a> {
    /// Start a new operation, resetting the `written` mask.
    pub fn new(pixmap: &'a mut Pixmap, clip: &'a Mask, written: &'a mut Mask) -> Self {
        debug_assert!(
            (clip.width(), clip.height()) == (pixmap.width(), pixmap.height())
                && (written.width(), written.height()) == (pixmap.width(), pixmap.height()),
            "masks must match the pixmap size"
        );
        written.fill(0);

        Self {
            pixmap,
            clip,
            written,
        }
    }

    /// Claim the pixel at `x`, `y` for this operation.
    ///
    /// Returns `false` if the pixel is clipped out or was already claimed.
    #[inline(always)]
    fn claim(&mut self, x: u16, y: u16) -> bool {
        if self.clip.sample(x, y) == 0 || self.written.sample(x, y) != 0 {
            return false;
        }
        self.written.set(x, y, 255);
        true
    }

    /// Blend `color` over the pixel at `x`, `y`.
    ///
    /// Returns whether the pixel was claimed by this call.
    pub fn composite(&mut self, x: u16, y: u16, color: Rgba8) -> bool {
        if !self.claim(x, y) {
            return false;
        }
        if color.a != 0 {
            let dst = self.pixmap.sample(x, y);
            self.pixmap.set_pixel(x, y, mix(color, dst));
        }
        true
    }

    /// Overwrite the pixel at `x`, `y` with `color`, without blending.
    ///
    /// Returns whether the pixel was claimed by this call.
    pub fn replace(&mut self, x: u16, y: u16, color: Rgba8) -> bool {
        if !self.claim(x, y) {
            return false;
        }
        self.pixmap.set_pixel(x, y, color);
        true
    }
}
