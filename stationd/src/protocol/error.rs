/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Failures surfaced to control-port clients.
//!
//! | Variant | Status |
//! |---|---|
//! | `BadRequest` | 400 |
//! | `Forbidden` | 403 |
//! | `NotFound` | 404 |
//! | `PayloadTooLarge` | 413 |
//! | `Storage` | 500 |

use thiserror::Error;

use super::response::StatusCode;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request line is not `GET <path> HTTP/1.1`, or the path does not
    /// start with `/`.
    #[error("malformed request: {0}")]
    BadRequest(String),

    /// The bare root path.
    #[error("path '/' is not accessible")]
    Forbidden,

    /// Unknown route or module name.
    #[error("no route for '{0}'")]
    NotFound(String),

    /// The request line outgrew the receive buffer.
    #[error("request line exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// An accepted change could not be persisted.
    #[error("failed to persist module: {0}")]
    Storage(#[from] StoreError),
}

impl ProtocolError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProtocolError::BadRequest(_) => StatusCode::BadRequest,
            ProtocolError::Forbidden => StatusCode::Forbidden,
            ProtocolError::NotFound(_) => StatusCode::NotFound,
            ProtocolError::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            ProtocolError::Storage(_) => StatusCode::InternalServerError,
        }
    }
}
