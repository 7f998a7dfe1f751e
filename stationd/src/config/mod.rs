/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Daemon configuration loading.
//!
//! Every key is optional; a missing file section falls back to its defaults.
//! The expected YAML structure is:
//! ```yaml
//! listen: "0.0.0.0:8080"
//! store_path: "/var/lib/stationd/store.bin"
//! poll_interval_ms: 10
//! http:
//!   min_buffer: 64
//!   max_buffer: 256
//! sync:
//!   max_tries: 5
//!   timeout_ms: 1000
//!   every_heartbeats: 3600
//!   persist_every_heartbeats: 5
//!   port: 123
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::device::{DeviceSettings, HeartbeatCadence};
use crate::protocol::BufferLimits;
use crate::sync::sntp::DEFAULT_PORT;
use crate::sync::SyncPolicy;

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StationConfigFile {
    #[serde(default = "default_listen")]
    listen: String,
    #[serde(default)]
    store_path: Option<PathBuf>,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default)]
    http: HttpSection,
    #[serde(default)]
    sync: SyncSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HttpSection {
    #[serde(default = "default_min_buffer")]
    min_buffer: usize,
    #[serde(default = "default_max_buffer")]
    max_buffer: usize,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            min_buffer: default_min_buffer(),
            max_buffer: default_max_buffer(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SyncSection {
    #[serde(default = "default_max_tries")]
    max_tries: u32,
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    #[serde(default = "default_every_heartbeats")]
    every_heartbeats: u32,
    #[serde(default = "default_persist_every_heartbeats")]
    persist_every_heartbeats: u32,
    #[serde(default = "default_sntp_port")]
    port: u16,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            max_tries: default_max_tries(),
            timeout_ms: default_timeout_ms(),
            every_heartbeats: default_every_heartbeats(),
            persist_every_heartbeats: default_persist_every_heartbeats(),
            port: default_sntp_port(),
        }
    }
}

fn default_listen() -> String {
    String::from("0.0.0.0:8080")
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_min_buffer() -> usize {
    64
}

fn default_max_buffer() -> usize {
    256
}

fn default_max_tries() -> u32 {
    5
}

fn default_timeout_ms() -> u64 {
    1_000
}

fn default_every_heartbeats() -> u32 {
    3_600
}

fn default_persist_every_heartbeats() -> u32 {
    5
}

fn default_sntp_port() -> u16 {
    DEFAULT_PORT
}

// ── Public configuration ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub listen: SocketAddr,
    /// Backing file for the store.  `None` keeps the store in memory.
    pub store_path: Option<PathBuf>,
    pub poll_interval: Duration,
    pub buffer: BufferLimits,
    pub device: DeviceSettings,
    /// UDP port queried on the time server.
    pub sntp_port: u16,
}

impl Default for StationConfig {
    fn default() -> Self {
        let http = HttpSection::default();
        let sync = SyncSection::default();
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store_path: None,
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            buffer: BufferLimits {
                min: http.min_buffer,
                max: http.max_buffer,
            },
            device: DeviceSettings {
                policy: SyncPolicy {
                    max_tries: sync.max_tries,
                    timeout: Duration::from_millis(sync.timeout_ms),
                },
                cadence: HeartbeatCadence {
                    sync_every: sync.every_heartbeats,
                    persist_every: sync.persist_every_heartbeats,
                },
            },
            sntp_port: sync.port,
        }
    }
}

impl StationConfig {
    /// Parses `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is malformed or
    /// contains unknown keys, or a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading station configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserializes as unit; treat it as "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: StationConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;
        Self::from_file(file)
    }

    fn from_file(file: StationConfigFile) -> Result<Self> {
        let listen: SocketAddr = file
            .listen
            .parse()
            .with_context(|| format!("listen: '{}' is not a socket address", file.listen))?;

        if file.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be non-zero");
        }
        if file.http.min_buffer < 2 {
            bail!("http.min_buffer must be at least 2");
        }
        if file.http.min_buffer > file.http.max_buffer {
            bail!(
                "http.min_buffer ({}) exceeds http.max_buffer ({})",
                file.http.min_buffer,
                file.http.max_buffer
            );
        }
        if file.sync.max_tries == 0 {
            bail!("sync.max_tries must be non-zero");
        }
        if file.sync.every_heartbeats == 0 || file.sync.persist_every_heartbeats == 0 {
            bail!("sync.every_heartbeats and sync.persist_every_heartbeats must be non-zero");
        }

        Ok(Self {
            listen,
            store_path: file.store_path,
            poll_interval: Duration::from_millis(file.poll_interval_ms),
            buffer: BufferLimits {
                min: file.http.min_buffer,
                max: file.http.max_buffer,
            },
            device: DeviceSettings {
                policy: SyncPolicy {
                    max_tries: file.sync.max_tries,
                    timeout: Duration::from_millis(file.sync.timeout_ms),
                },
                cadence: HeartbeatCadence {
                    sync_every: file.sync.every_heartbeats,
                    persist_every: file.sync.persist_every_heartbeats,
                },
            },
            sntp_port: file.sync.port,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
