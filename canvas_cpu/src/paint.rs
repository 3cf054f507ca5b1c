// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Types for paints.

use std::fmt::Debug;
use std::sync::Arc;

use canvas_common::kurbo::{Affine, Point};
use peniko::color::Rgba8;

use crate::pixmap::{Pixmap, TRANSPARENT};

/// A source of colors sampled per pixel, for example a gradient.
pub trait PaintSource: Debug + Send + Sync {
    /// The straight-alpha color at the device position `x`, `y`.
    fn color_at(&self, x: f64, y: f64) -> Rgba8;
}

/// How an image pattern continues outside of its image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// Tile the image in both directions.
    #[default]
    Repeat,
    /// Tile the image horizontally only.
    RepeatX,
    /// Tile the image vertically only.
    RepeatY,
    /// Draw the image once.
    NoRepeat,
}

impl Repeat {
    fn repeats_x(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatX)
    }

    fn repeats_y(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatY)
    }
}

/// An image used as a paint, sampled with nearest-neighbour filtering.
#[derive(Debug, Clone)]
pub struct ImagePattern {
    image: Arc<Pixmap>,
    /// Maps device space into image space.
    inverse: Affine,
    repeat: Repeat,
}

impl ImagePattern {
    /// Create a new pattern with the image placed at the origin.
    pub fn new(image: Arc<Pixmap>, repeat: Repeat) -> Self {
        Self {
            image,
            inverse: Affine::IDENTITY,
            repeat,
        }
    }

    /// Place the image with `transform`, which maps image space into device space.
    ///
    /// A non-invertible transform makes the pattern transparent.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        let det = transform.determinant();
        self.inverse = if det != 0.0 && det.is_finite() {
            transform.inverse()
        } else {
            Affine::scale(f64::NAN)
        };
        self
    }

    /// The color of the pattern at the device position `x`, `y`.
    pub fn color_at(&self, x: f64, y: f64) -> Rgba8 {
        let (w, h) = (self.image.width(), self.image.height());
        if w == 0 || h == 0 {
            return TRANSPARENT;
        }

        let p = self.inverse * Point::new(x, y);
        let Some(px) = wrap(p.x, w, self.repeat.repeats_x()) else {
            return TRANSPARENT;
        };
        let Some(py) = wrap(p.y, h, self.repeat.repeats_y()) else {
            return TRANSPARENT;
        };

        self.image.sample(px, py)
    }
}

/// The pixel index of `v` on an axis of length `len`.
fn wrap(v: f64, len: u16, repeat: bool) -> Option<u16> {
    if !v.is_finite() {
        return None;
    }
    let len_f = f64::from(len);
    let v = v.floor();
    if repeat {
        Some(v.rem_euclid(len_f).min(len_f - 1.0) as u16)
    } else if (0.0..len_f).contains(&v) {
        Some(v as u16)
    } else {
        None
    }
}

/// A paint used to fill shapes.
#[derive(Debug, Clone)]
pub enum Paint {
    /// A solid straight-alpha color.
    Solid(Rgba8),
    /// An image pattern.
    Image(ImagePattern),
    /// A custom color source.
    Custom(Arc<dyn PaintSource>),
}

impl Paint {
    /// The color of the paint at the device position `x`, `y`.
    pub fn color_at(&self, x: f64, y: f64) -> Rgba8 {
        match self {
            Self::Solid(color) => *color,
            Self::Image(pattern) => pattern.color_at(x, y),
            Self::Custom(source) => source.color_at(x, y),
        }
    }
}

impl From<Rgba8> for Paint {
    fn from(value: Rgba8) -> Self {
        Self::Solid(value)
    }
}

impl From<ImagePattern> for Paint {
    fn from(value: ImagePattern) -> Self {
        Self::Image(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ImagePattern, Paint, Repeat};
    use crate::pixmap::Pixmap;
    use canvas_common::kurbo::Affine;
    use peniko::color::Rgba8;
    use std::sync::Arc;

    fn checker() -> Arc<Pixmap> {
        let mut pixmap = Pixmap::new(2, 2);
        let white = Rgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        };
        pixmap.set_pixel(0, 0, white);
        pixmap.set_pixel(1, 1, white);
        Arc::new(pixmap)
    }

    #[test]
    fn repeat_wraps_both_axes() {
        let pattern = ImagePattern::new(checker(), Repeat::Repeat);

        assert_eq!(pattern.color_at(0.5, 0.5).a, 255);
        assert_eq!(pattern.color_at(2.5, 2.5).a, 255);
        assert_eq!(pattern.color_at(-0.5, 0.5).a, 0);
        assert_eq!(pattern.color_at(-1.5, -1.5).a, 255);
    }

    #[test]
    fn no_repeat_is_transparent_outside() {
        let pattern = ImagePattern::new(checker(), Repeat::NoRepeat);
        assert_eq!(pattern.color_at(0.5, 0.5).a, 255);
        assert_eq!(pattern.color_at(2.5, 2.5).a, 0);

        let pattern = ImagePattern::new(checker(), Repeat::RepeatX);
        assert_eq!(pattern.color_at(2.5, 0.5).a, 255);
        assert_eq!(pattern.color_at(0.5, 2.5).a, 0);
    }

    #[test]
    fn transform_places_image() {
        let pattern = ImagePattern::new(checker(), Repeat::NoRepeat)
            .with_transform(Affine::translate((10.0, 20.0)) * Affine::scale(4.0));

        assert_eq!(pattern.color_at(11.0, 21.0).a, 255);
        assert_eq!(pattern.color_at(15.0, 21.0).a, 0);
        assert_eq!(pattern.color_at(15.0, 25.0).a, 255);
        assert_eq!(pattern.color_at(9.0, 21.0).a, 0);

        let singular = ImagePattern::new(checker(), Repeat::Repeat).with_transform(Affine::scale(0.0));
        assert_eq!(Paint::Image(singular).color_at(0.5, 0.5).a, 0);
    }
}
