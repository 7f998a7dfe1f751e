/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Time-source hostname module.

use super::{FieldContext, Module};
use crate::store::layout::{self, pad_text, unpad_text};
use crate::store::{Record, Region};

/// Size of the NUL-padded hostname field.
pub const HOSTNAME_CAPACITY: usize = 32;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeServerRecord {
    pub server: [u8; HOSTNAME_CAPACITY],
}

impl Default for TimeServerRecord {
    fn default() -> Self {
        Self {
            server: pad_text(b"pool.ntp.org"),
        }
    }
}

impl Record for TimeServerRecord {
    const REGION: Region = layout::TIME_SERVER;

    fn encode(&self) -> Vec<u8> {
        self.server.to_vec()
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut server = [0u8; HOSTNAME_CAPACITY];
        server.copy_from_slice(&bytes[..HOSTNAME_CAPACITY]);
        Self { server }
    }
}

// ── Live state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeServer {
    server: [u8; HOSTNAME_CAPACITY],
}

impl TimeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hostname(&self) -> String {
        unpad_text(&self.server)
    }
}

impl Module for TimeServer {
    type Record = TimeServerRecord;

    fn serialize(&self) -> TimeServerRecord {
        TimeServerRecord {
            server: self.server,
        }
    }

    fn configure(&mut self, record: &TimeServerRecord) {
        self.server = record.server;
    }

    fn apply_field(
        working: &mut TimeServerRecord,
        _old: &TimeServerRecord,
        key: &[u8],
        value: &[u8],
        _ctx: &FieldContext,
    ) {
        if key.eq_ignore_ascii_case(b"server")
            && !value.is_empty()
            && value.len() < HOSTNAME_CAPACITY
        {
            working.server = pad_text(value);
        }
    }

    fn describe(&self, record: &TimeServerRecord) -> Vec<String> {
        vec![unpad_text(&record.server)]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
