/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type for the non-volatile store.
//!
//! A header guard mismatch is **not** an error: it is recovered
//! locally by [`initialize_or_reset`](super::initialize_or_reset) and only
//! shows up as [`StoreStatus::FactoryReset`](super::StoreStatus).

use thiserror::Error;

/// Failure while reading or writing a byte range of the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested range does not fit inside the medium.
    #[error("range {offset}..{} is outside the {capacity}-byte store", .offset + .len)]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// The backing file could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
