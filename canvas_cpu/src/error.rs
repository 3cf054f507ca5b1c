// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors that can occur when configuring or reading back a render context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested MSAA level is not supported.
    #[error("MSAA level {level} is higher than the maximum of {max}")]
    MsaaLevelTooHigh {
        /// The requested level.
        level: u8,
        /// The highest supported level.
        max: u8,
    },
    /// A pixmap does not have the size of the render context.
    #[error("Pixmap of size {width}x{height} does not match the render context")]
    InvalidSize {
        /// The width of the pixmap.
        width: u16,
        /// The height of the pixmap.
        height: u16,
    },
}
