/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The five independently persisted configuration modules.
//!
//! ```text
//! route       module                      record
//! ─────────   ─────────────────────────   ─────────────────
//! countdown   countdown::Countdown        CountdownRecord
//! lcd         display::DisplayMessage     DisplayRecord
//! net         network::NetworkIdentity    NetworkRecord
//! ntp         time_server::TimeServer     TimeServerRecord
//! time        clock::Clock                ClockRecord
//! ```
//!
//! Every module owns its live state, which is the authoritative copy.  The
//! stored record is a cache: read once at boot and rewritten after every
//! accepted change.

pub mod clock;
pub mod countdown;
pub mod display;
pub mod network;
pub mod parse;
pub mod time_server;

use crate::store::Record;

// ── Module contract ───────────────────────────────────────────────────────────

/// Live values of *other* modules that a field setter may validate against.
///
/// Captured before the update starts so setters never need a borrow of the
/// whole device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldContext {
    /// Current clock time, epoch seconds.
    pub clock_now: u32,
    /// Current countdown target, epoch seconds.
    pub countdown_target: u32,
}

/// A configuration module with a fixed-size persisted record.
pub trait Module {
    type Record: Record;

    /// Encodes the current live state.  Must not have side effects.
    fn serialize(&self) -> Self::Record;

    /// Replaces live state from `record`.  Must be idempotent and must not
    /// persist anything itself.
    fn configure(&mut self, record: &Self::Record);

    /// Applies one `key=value` pair from a `set` query to `working`.
    ///
    /// `value` holds the decoded bytes exactly as sent, which need not be
    /// UTF-8.  `old` is the record as it was before the request; setters
    /// that reject a value restore the field from it.  Unknown keys are
    /// ignored.
    fn apply_field(
        working: &mut Self::Record,
        old: &Self::Record,
        key: &[u8],
        value: &[u8],
        ctx: &FieldContext,
    );

    /// Renders `record` (plus any derived live values) as the ordered list of
    /// strings returned by `get/<module>`.
    fn describe(&self, record: &Self::Record) -> Vec<String>;
}

// ── Route table ───────────────────────────────────────────────────────────────

/// The five module kinds, keyed by their route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Countdown,
    Display,
    Network,
    TimeServer,
    Clock,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Countdown,
        ModuleKind::Display,
        ModuleKind::Network,
        ModuleKind::TimeServer,
        ModuleKind::Clock,
    ];

    /// Route segment used in `get/<segment>` and `set/<segment>`.
    pub fn route(self) -> &'static str {
        match self {
            ModuleKind::Countdown => "countdown",
            ModuleKind::Display => "lcd",
            ModuleKind::Network => "net",
            ModuleKind::TimeServer => "ntp",
            ModuleKind::Clock => "time",
        }
    }

    /// Looks up a route segment, ignoring ASCII case.
    pub fn from_route(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.route().eq_ignore_ascii_case(segment))
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.route())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
