// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

mod basic;
mod util;
