// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry shared by the canvas backends.
//!
//! This crate turns linearized contours into triangle lists. Every backend consumes the same
//! lists: [`canvas_cpu`][canvas_cpu] scan converts them into a pixmap, a GPU backend would
//! upload them as index buffers.
//!
//! # Contents
//!
//! - [`earcut`]: ear-clipping triangulation of a polygon with holes.
//! - [`classify`]: grouping of untagged glyph contours into outer contours and holes.
//!
//! Curves need to be flattened before they reach this crate; it only deals with points.
//!
//! # Example
//!
//! ```
//! use canvas_common::earcut::{triangle_area, triangulate};
//! use canvas_common::kurbo::Point;
//!
//! let outer = [(0., 0.), (4., 0.), (4., 4.), (0., 4.)].map(Point::from);
//! let hole = [(1., 1.), (1., 3.), (3., 3.), (3., 1.)].map(Point::from);
//! let indices = triangulate(&outer, &[&hole[..]]);
//!
//! let points: Vec<Point> = outer.iter().chain(&hole).copied().collect();
//! assert!((triangle_area(&points, &indices) - 12.0).abs() < 1e-9);
//! ```
//!
//! [canvas_cpu]: https://docs.rs/canvas_cpu
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
// Vertex counts are checked to fit into u32 before indices are handed out.
#![allow(clippy::cast_possible_truncation)]

pub mod classify;
pub mod earcut;

pub use classify::{classify_and_triangulate, ContourGroup};
pub use earcut::{triangulate, Earcut};

pub use peniko;
pub use peniko::kurbo;
