/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Control-port protocol: path routing and the generic update algorithm.
//!
//! ```text
//! GET /get/<module> HTTP/1.1          → 200 {"data":[...]}
//! GET /set/<module>?k=v&k=v HTTP/1.1  → apply, persist if changed, then as get
//! ```
//!
//! Transport concerns (reading the request line, writing the response) live
//! in [`crate::server`].

pub mod error;
pub mod request;
pub mod response;

use tracing::{debug, info};

use crate::modules::{FieldContext, Module, ModuleKind};
use crate::store::{write_record, PersistentStore, StoreError};

pub use error::ProtocolError;
pub use request::{parse_query, parse_request_line, percent_decode, BufferLimits, Feed, LineBuffer};
pub use response::{Body, Response, StatusCode, SERVER_NAME};

// ── Routing ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Get(ModuleKind),
    /// Module plus the raw (still percent-encoded) query bytes.
    Set(ModuleKind, Vec<u8>),
}

/// Splits off the next token delimited by any of `delims`, skipping leading
/// delimiters.  Returns the token and whatever follows the delimiter that
/// ended it.
fn next_token<'a>(input: &'a [u8], delims: &[u8]) -> Option<(&'a [u8], &'a [u8])> {
    let skip = input.iter().position(|b| !delims.contains(b))?;
    let start = &input[skip..];
    match start.iter().position(|b| delims.contains(b)) {
        Some(at) => Some((&start[..at], &start[at + 1..])),
        None => Some((start, &input[input.len()..])),
    }
}

/// Looks up a route segment; segments that are not UTF-8 never match.
fn module_for(segment: &[u8]) -> Option<ModuleKind> {
    std::str::from_utf8(segment).ok().and_then(ModuleKind::from_route)
}

/// Maps a request path onto a [`Route`].
///
/// * path not starting with `/` → `BadRequest`
/// * exactly `/` → `Forbidden`
/// * anything that is not `get/<module>` or `set/<module>[?query]` → `NotFound`
pub fn parse_route(path: &[u8]) -> Result<Route, ProtocolError> {
    let shown = || String::from_utf8_lossy(path).into_owned();

    if !path.starts_with(b"/") {
        return Err(ProtocolError::BadRequest(format!("path '{}' is not absolute", shown())));
    }
    if path == b"/" {
        return Err(ProtocolError::Forbidden);
    }

    let not_found = || ProtocolError::NotFound(shown());

    let (verb, rest) = next_token(path, b"/").ok_or_else(not_found)?;

    if verb.eq_ignore_ascii_case(b"get") {
        let (segment, _) = next_token(rest, b"/").ok_or_else(not_found)?;
        let kind = module_for(segment).ok_or_else(not_found)?;
        return Ok(Route::Get(kind));
    }

    if verb.eq_ignore_ascii_case(b"set") {
        let (segment, query) = next_token(rest, b"/?").ok_or_else(not_found)?;
        let kind = module_for(segment).ok_or_else(not_found)?;
        return Ok(Route::Set(kind, query.to_vec()));
    }

    Err(not_found())
}

// ── Generic update ────────────────────────────────────────────────────────────

/// Applies a `set` query to `module` and persists the result if it changed.
///
/// 1. `old` is the serialized live state, `working` a copy of it.
/// 2. Each `key=value` pair is decoded and handed to the module's field
///    setter, which may accept it or restore the field from `old`.
/// 3. If `working` differs from `old` the module is reconfigured from it and
///    the record is written to its region of the store.
///
/// Returns whether anything changed.  A store failure leaves the live state
/// already reconfigured; the next accepted change rewrites the full record.
pub fn apply_update<M, S>(
    module: &mut M,
    store: &mut S,
    query: &[u8],
    ctx: &FieldContext,
) -> Result<bool, StoreError>
where
    M: Module,
    S: PersistentStore + ?Sized,
{
    let old = module.serialize();
    let mut working = old.clone();

    for (key, value) in parse_query(query) {
        M::apply_field(&mut working, &old, &key, &value, ctx);
    }

    if working == old {
        debug!("update left record unchanged, skipping write");
        return Ok(false);
    }

    module.configure(&working);
    write_record(store, &working)?;
    info!(record = ?working, "module updated");
    Ok(true)
}

/// Writes the module's current live state to the store unconditionally.
pub fn persist<M, S>(module: &M, store: &mut S) -> Result<(), StoreError>
where
    M: Module,
    S: PersistentStore + ?Sized,
{
    write_record(store, &module.serialize())
}

/// Builds the `get/<module>` response from live state.
pub fn get_response<M: Module>(module: &M) -> Response {
    Response::data(module.describe(&module.serialize()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
