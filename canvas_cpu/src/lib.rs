// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A CPU renderer for triangulated canvas paths.
//!
//! Shapes are triangulated with [`canvas_common`] and scan converted one row at a time,
//! sampling pixel centers. With MSAA enabled, edge pixels are sampled on a sub-pixel grid
//! and resolved into one averaged color. Every drawing operation writes each pixel at most
//! once, so overlapping triangles of a single shape never blend into each other.
//!
//! ```
//! use canvas_cpu::kurbo::Point;
//! use canvas_cpu::peniko::color::Rgba8;
//! use canvas_cpu::RenderContext;
//!
//! let mut ctx = RenderContext::new(16, 16);
//! ctx.set_paint(Rgba8 { r: 255, g: 0, b: 0, a: 255 });
//! let square = [(2., 2.), (14., 2.), (14., 14.), (2., 14.)].map(Point::from);
//! ctx.fill_polygon(&square, &[] as &[&[Point]]);
//!
//! assert_eq!(ctx.pixmap().sample(8, 8).r, 255);
//! assert_eq!(ctx.pixmap().sample(0, 0).a, 0);
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
// Coordinates are clamped to the pixmap before being cast to u16.
#![allow(clippy::cast_possible_truncation)]

pub mod blur;
pub mod compose;
mod error;
pub mod mask;
pub mod msaa;
pub mod paint;
pub mod pixmap;
pub mod raster;
mod render;

pub use error::Error;
pub use mask::Mask;
pub use paint::{ImagePattern, Paint, PaintSource, Repeat};
pub use pixmap::Pixmap;
pub use render::{RenderContext, RenderSettings, Shadow};

pub use canvas_common;
pub use canvas_common::kurbo;
pub use peniko;
