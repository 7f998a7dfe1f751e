/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Non-volatile configuration store.
//!
//! The medium is modelled as a flat, byte-addressable array (an EEPROM on the
//! real board).  [`PersistentStore`] is the only seam to the hardware; two
//! implementations are provided:
//!
//! * [`MemoryStore`] – a `Vec<u8>`; used by unit tests and when the daemon is
//!   started without a `store_path`.
//! * [`FileStore`] – a fixed-size image file, written byte by byte.
//!
//! Sub-records are never bulk-rewritten: callers read and write a single
//! [`Record`] at a time through [`read_record`] / [`write_record`], so a
//! power loss can corrupt at most the one region being written.

pub mod error;
pub mod layout;

pub use error::StoreError;
pub use layout::{Header, Region};

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Size of the EEPROM on the reference board.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Value of an erased (never written) byte.
const ERASED: u8 = 0xFF;

// ── Store contract ────────────────────────────────────────────────────────────

/// Byte-granular access to the non-volatile medium.
pub trait PersistentStore {
    /// Reads `len` bytes starting at `offset`.
    fn read_range(&mut self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError>;

    /// Writes `bytes` starting at `offset`.
    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Fixed-size encoded form of one module's state.
///
/// `Default` must return the compiled-in factory value; it is what
/// [`factory_reset`] writes.
pub trait Record: Clone + PartialEq + Default + fmt::Debug {
    /// Where the record lives in the store.
    const REGION: Region;

    /// Encodes into exactly `REGION.len` bytes.
    fn encode(&self) -> Vec<u8>;

    /// Decodes from exactly `REGION.len` bytes.
    fn decode(bytes: &[u8]) -> Self;
}

/// Reads and decodes the record stored at `R::REGION`.
pub fn read_record<R: Record, S: PersistentStore + ?Sized>(store: &mut S) -> Result<R, StoreError> {
    let bytes = store.read_range(R::REGION.offset, R::REGION.len)?;
    Ok(R::decode(&bytes))
}

/// Encodes `record` and writes it to `R::REGION`.
pub fn write_record<R: Record, S: PersistentStore + ?Sized>(
    store: &mut S,
    record: &R,
) -> Result<(), StoreError> {
    let bytes = record.encode();
    debug_assert_eq!(bytes.len(), R::REGION.len);
    store.write_range(R::REGION.offset, &bytes)
}

// ── Header guard ──────────────────────────────────────────────────────────────

/// Outcome of [`initialize_or_reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The header matched; existing contents were kept.
    Intact,
    /// The header did not match and the factory image was written.
    FactoryReset,
}

/// Verifies the header guard, writing the factory image if it does not match.
pub fn initialize_or_reset<S: PersistentStore + ?Sized>(
    store: &mut S,
) -> Result<StoreStatus, StoreError> {
    let bytes = store.read_range(layout::HEADER.offset, layout::HEADER.len)?;
    let header = Header::decode(&bytes);

    if header.is_valid() {
        debug!(
            magic = %format!("{:#010x}", header.magic),
            version = header.version,
            "store header ok"
        );
        return Ok(StoreStatus::Intact);
    }

    warn!(
        found_magic = %format!("{:#010x}", header.magic),
        found_version = header.version,
        expected_magic = %format!("{:#010x}", layout::EXPECTED_MAGIC),
        expected_version = layout::EXPECTED_VERSION,
        "store header mismatch, restoring factory defaults"
    );
    factory_reset(store)?;
    Ok(StoreStatus::FactoryReset)
}

/// Writes the whole factory image (header and every default sub-record).
pub fn factory_reset<S: PersistentStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let image = layout::factory_image();
    store.write_range(0, &image)?;
    info!(bytes = image.len(), "factory image written");
    Ok(())
}

fn check_bounds(offset: usize, len: usize, capacity: usize) -> Result<(), StoreError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StoreError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// Volatile in-memory store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bytes: Vec<u8>,
    byte_writes: usize,
}

impl MemoryStore {
    /// Creates an erased store of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![ERASED; capacity],
            byte_writes: 0,
        }
    }

    /// Raw contents, for inspection.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable raw contents, bypassing the write counter.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Number of bytes physically written so far (unchanged bytes are skipped).
    pub fn byte_writes(&self) -> usize {
        self.byte_writes
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PersistentStore for MemoryStore {
    fn read_range(&mut self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError> {
        check_bounds(offset, len, self.bytes.len())?;
        Ok(self.bytes[offset..offset + len].to_vec())
    }

    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        check_bounds(offset, bytes.len(), self.bytes.len())?;
        for (cell, &b) in self.bytes[offset..].iter_mut().zip(bytes) {
            if *cell != b {
                *cell = b;
                self.byte_writes += 1;
            }
        }
        Ok(())
    }
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// Store backed by a fixed-size image file.
///
/// Writes go one byte at a time and skip bytes that already hold the target
/// value, matching the update semantics of the on-board EEPROM.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    file: File,
    capacity: usize,
}

impl FileStore {
    /// Opens `path`, creating an erased image of `capacity` bytes if it does
    /// not exist yet.  A shorter existing file is extended with erased bytes.
    pub fn open(path: &Path, capacity: usize) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let current = file.metadata()?.len() as usize;
        if current < capacity {
            info!(
                path = %path.display(),
                existing = current,
                capacity,
                "extending store image with erased bytes"
            );
            file.seek(SeekFrom::Start(current as u64))?;
            file.write_all(&vec![ERASED; capacity - current])?;
            file.sync_data()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistentStore for FileStore {
    fn read_range(&mut self, offset: usize, len: usize) -> Result<Vec<u8>, StoreError> {
        check_bounds(offset, len, self.capacity)?;
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        let current = self.read_range(offset, bytes.len())?;
        let mut written = 0usize;
        for (i, (&old, &new)) in current.iter().zip(bytes).enumerate() {
            if old == new {
                continue;
            }
            self.file.seek(SeekFrom::Start((offset + i) as u64))?;
            self.file.write_all(&[new])?;
            written += 1;
        }
        if written > 0 {
            self.file.sync_data()?;
        }
        debug!(offset, len = bytes.len(), written, "store range written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
