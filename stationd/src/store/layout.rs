/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed byte layout of the persisted record.
//!
//! ```text
//! offset  size  sub-record
//! ──────  ────  ──────────────────────────────────────────────
//!      0     6  header        magic u32 | version u16
//!      6     4  countdown     target seconds u32
//!     10    35  display       text [u8; 32] | r | g | b
//!     45    23  network       flags | mac [u8; 6] | ip | dns | gateway | subnet
//!     68    32  time server   hostname [u8; 32], NUL padded
//!    100     8  clock         seconds u32 | sync interval u32
//!    108        end
//! ```
//!
//! Each region starts where the previous one ends, so a field's address is
//! always `header size + Σ(preceding sub-record sizes)`.  All multi-byte
//! integers are little-endian.

use super::Record;
use crate::modules::clock::ClockRecord;
use crate::modules::countdown::CountdownRecord;
use crate::modules::display::DisplayRecord;
use crate::modules::network::NetworkRecord;
use crate::modules::time_server::TimeServerRecord;

// ── Header guard ──────────────────────────────────────────────────────────────

/// Magic number expected at offset 0.
pub const EXPECTED_MAGIC: u32 = 0x3454_4C40;

/// Layout version expected right after the magic.  Bump whenever any region
/// changes size or meaning.
pub const EXPECTED_VERSION: u16 = 120;

/// Header guard stored in front of the module sub-records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u32,
    pub version: u16,
}

impl Header {
    /// The header this build writes and expects to find.
    pub const EXPECTED: Header = Header {
        magic: EXPECTED_MAGIC,
        version: EXPECTED_VERSION,
    };

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER.len);
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Self {
        Header {
            magic: le_u32(bytes, 0),
            version: le_u16(bytes, 4),
        }
    }

    /// Returns `true` when both guard values match this build.
    pub fn is_valid(&self) -> bool {
        *self == Self::EXPECTED
    }
}

// ── Regions ───────────────────────────────────────────────────────────────────

/// A contiguous byte range of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub const fn new(offset: usize, len: usize) -> Self {
        Region { offset, len }
    }

    /// The region of `len` bytes that immediately follows `self`.
    pub const fn next(self, len: usize) -> Self {
        Region {
            offset: self.end(),
            len,
        }
    }

    /// One past the last byte of the region.
    pub const fn end(self) -> usize {
        self.offset + self.len
    }
}

pub const HEADER: Region = Region::new(0, 6);
pub const COUNTDOWN: Region = HEADER.next(4);
pub const DISPLAY: Region = COUNTDOWN.next(35);
pub const NETWORK: Region = DISPLAY.next(23);
pub const TIME_SERVER: Region = NETWORK.next(32);
pub const CLOCK: Region = TIME_SERVER.next(8);

/// Total number of bytes covered by the layout.
pub const IMAGE_SIZE: usize = CLOCK.end();

// ── Factory image ─────────────────────────────────────────────────────────────

/// Builds the complete default image: valid header followed by every
/// module's compiled-in default record.
pub fn factory_image() -> Vec<u8> {
    let mut image = Vec::with_capacity(IMAGE_SIZE);
    image.extend(Header::EXPECTED.encode());
    image.extend(CountdownRecord::default().encode());
    image.extend(DisplayRecord::default().encode());
    image.extend(NetworkRecord::default().encode());
    image.extend(TimeServerRecord::default().encode());
    image.extend(ClockRecord::default().encode());
    image
}

// ── Byte helpers ──────────────────────────────────────────────────────────────

pub(crate) fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

pub(crate) fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

/// Copies `text` into a zero-filled fixed-size field, truncating if needed.
pub(crate) fn pad_text<const N: usize>(text: &[u8]) -> [u8; N] {
    let mut field = [0u8; N];
    let n = text.len().min(N);
    field[..n].copy_from_slice(&text[..n]);
    field
}

/// Reads a NUL-terminated string out of a fixed-size field.
pub(crate) fn unpad_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
