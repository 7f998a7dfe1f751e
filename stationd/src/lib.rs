/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! stationd – countdown station control plane
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── store/      – byte-addressed persistent store, layout, header guard
//! ├── modules/    – the five configuration modules and their records
//! ├── protocol/   – request parsing, routing, diff-and-write updater
//! ├── sync/       – tick source, time-source sync, SNTP client
//! ├── display.rs  – display sinks and line formatting
//! ├── net.rs      – DHCP / static address bring-up
//! ├── device.rs   – owning aggregate: boot, poll, heartbeat, requests
//! ├── server.rs   – single-task main loop and connection handling
//! └── config/     – YAML daemon configuration
//! ```

pub mod config;
pub mod device;
pub mod display;
pub mod modules;
pub mod net;
pub mod protocol;
pub mod server;
pub mod store;
pub mod sync;
