/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Display message module: one line of text plus a backlight colour.

use super::parse::parse_ulong;
use super::{FieldContext, Module};
use crate::store::layout::{self, pad_text, unpad_text};
use crate::store::{Record, Region};

/// Size of the NUL-padded text field.  Accepted messages are strictly
/// shorter so at least one terminator byte always remains.
pub const TEXT_CAPACITY: usize = 32;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRecord {
    pub text: [u8; TEXT_CAPACITY],
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for DisplayRecord {
    fn default() -> Self {
        Self {
            text: pad_text(b"Hoist the sails"),
            r: 89,
            g: 19,
            b: 174,
        }
    }
}

impl Record for DisplayRecord {
    const REGION: Region = layout::DISPLAY;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::REGION.len);
        out.extend_from_slice(&self.text);
        out.extend_from_slice(&[self.r, self.g, self.b]);
        out
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut text = [0u8; TEXT_CAPACITY];
        text.copy_from_slice(&bytes[..TEXT_CAPACITY]);
        Self {
            text,
            r: bytes[TEXT_CAPACITY],
            g: bytes[TEXT_CAPACITY + 1],
            b: bytes[TEXT_CAPACITY + 2],
        }
    }
}

// ── Live state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    text: [u8; TEXT_CAPACITY],
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DisplayMessage {
    /// Blank white message, the state before the stored record is pulled.
    pub fn new() -> Self {
        Self {
            text: [0; TEXT_CAPACITY],
            r: 0xFF,
            g: 0xFF,
            b: 0xFF,
        }
    }

    pub fn text(&self) -> String {
        unpad_text(&self.text)
    }

    pub fn color(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

impl Default for DisplayMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for DisplayMessage {
    type Record = DisplayRecord;

    fn serialize(&self) -> DisplayRecord {
        DisplayRecord {
            text: self.text,
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    fn configure(&mut self, record: &DisplayRecord) {
        self.text = record.text;
        self.r = record.r;
        self.g = record.g;
        self.b = record.b;
    }

    fn apply_field(
        working: &mut DisplayRecord,
        _old: &DisplayRecord,
        key: &[u8],
        value: &[u8],
        _ctx: &FieldContext,
    ) {
        if key.eq_ignore_ascii_case(b"msg") {
            if value.len() < TEXT_CAPACITY {
                working.text = pad_text(value);
            }
        } else if key.eq_ignore_ascii_case(b"r") {
            working.r = parse_ulong(value) as u8;
        } else if key.eq_ignore_ascii_case(b"g") {
            working.g = parse_ulong(value) as u8;
        } else if key.eq_ignore_ascii_case(b"b") {
            working.b = parse_ulong(value) as u8;
        }
    }

    fn describe(&self, record: &DisplayRecord) -> Vec<String> {
        vec![
            record.r.to_string(),
            record.g.to_string(),
            record.b.to_string(),
            unpad_text(&record.text),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn set(working: &mut DisplayRecord, key: &str, value: impl AsRef<[u8]>) {
        let old = *working;
        DisplayMessage::apply_field(
            working,
            &old,
            key.as_bytes(),
            value.as_ref(),
            &FieldContext::default(),
        );
    }

    #[test]
    fn factory_default_message() {
        let mut msg = DisplayMessage::new();
        msg.configure(&DisplayRecord::default());
        assert_eq!(msg.text(), "Hoist the sails");
        assert_eq!(msg.color(), (89, 19, 174));
    }

    #[test]
    fn message_shorter_than_capacity_is_accepted() {
        let mut rec = DisplayRecord::default();
        set(&mut rec, "msg", "Shine on!");
        assert_eq!(unpad_text(&rec.text), "Shine on!");
        // the previous, longer text must not leave a tail behind
        assert!(rec.text[9..].iter().all(|&b| b == 0));
    }

    #[test]
    fn message_at_capacity_is_rejected() {
        let mut rec = DisplayRecord::default();
        let exact = "x".repeat(TEXT_CAPACITY);
        set(&mut rec, "msg", &exact);
        assert_eq!(rec, DisplayRecord::default());

        let fits = "y".repeat(TEXT_CAPACITY - 1);
        set(&mut rec, "MSG", &fits);
        assert_eq!(unpad_text(&rec.text), fits);
    }

    #[test]
    fn message_capacity_counts_raw_bytes() {
        let mut rec = DisplayRecord::default();
        set(&mut rec, "msg", [0xE9u8; TEXT_CAPACITY - 1]);
        assert_eq!(&rec.text[..TEXT_CAPACITY - 1], &[0xE9u8; TEXT_CAPACITY - 1]);
        assert_eq!(rec.text[TEXT_CAPACITY - 1], 0);

        let before = rec;
        set(&mut rec, "msg", [0xE9u8; TEXT_CAPACITY]);
        assert_eq!(rec, before);
    }

    #[test]
    fn colour_channels_are_independent() {
        let mut rec = DisplayRecord::default();
        set(&mut rec, "g", "200");
        assert_eq!((rec.r, rec.g, rec.b), (89, 200, 174));
        set(&mut rec, "r", "0x10");
        set(&mut rec, "b", "nope");
        assert_eq!((rec.r, rec.g, rec.b), (16, 200, 0));
    }

    #[test]
    fn colour_keeps_low_eight_bits() {
        let mut rec = DisplayRecord::default();
        set(&mut rec, "r", "257");
        assert_eq!(rec.r, 1);
    }

    #[test]
    fn configure_serialize_is_idempotent() {
        let mut msg = DisplayMessage::new();
        msg.configure(&DisplayRecord::default());
        let before = msg.clone();
        msg.configure(&msg.serialize());
        assert_eq!(msg, before);
    }

    #[test]
    fn describe_lists_colour_then_text() {
        let msg = DisplayMessage::new();
        let rec = DisplayRecord::default();
        assert_eq!(msg.describe(&rec), vec!["89", "19", "174", "Hoist the sails"]);
    }
}
