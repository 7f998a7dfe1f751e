/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Minimal SNTP client over UDP.
//!
//! Only the transmit timestamp's seconds field is used; fractions, delays
//! and stratum are ignored.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, warn};

use super::TimeSource;

pub const PACKET_SIZE: usize = 48;

/// Seconds between 1900-01-01 and 1970-01-01.
pub const UNIX_OFFSET: u32 = 2_208_988_800;

pub const DEFAULT_PORT: u16 = 123;

/// Used when the configured hostname does not resolve.
pub const FALLBACK_HOST: &str = "time.nist.gov";
pub const FALLBACK_ADDR: Ipv4Addr = Ipv4Addr::new(192, 43, 244, 18);

const TRANSMIT_SECONDS: usize = 40;

// ── Packets ───────────────────────────────────────────────────────────────────

/// Client request: LI=3 (unsynchronised), version 4, mode 3.
pub fn request_packet() -> [u8; PACKET_SIZE] {
    let mut buf = [0u8; PACKET_SIZE];
    buf[0] = 0b1110_0011;
    buf[1] = 0; // stratum
    buf[2] = 6; // poll interval
    buf[3] = 0xEC; // precision
    buf[12..16].copy_from_slice(&[49, 0x4E, 49, 52]);
    buf
}

/// Server answer carrying `epoch` (Unix seconds) as its transmit timestamp.
pub fn response_packet(epoch: u32) -> [u8; PACKET_SIZE] {
    let mut buf = [0u8; PACKET_SIZE];
    buf[0] = 0b0010_0100; // LI=0, version 4, mode 4
    buf[1] = 1;
    let ntp = epoch.wrapping_add(UNIX_OFFSET);
    buf[TRANSMIT_SECONDS..TRANSMIT_SECONDS + 4].copy_from_slice(&ntp.to_be_bytes());
    buf
}

/// Extracts Unix seconds from a server answer.  `None` for short packets or
/// a zero result.
pub fn parse_response(buf: &[u8]) -> Option<u32> {
    let field = buf.get(TRANSMIT_SECONDS..TRANSMIT_SECONDS + 4)?;
    let ntp = u32::from_be_bytes([field[0], field[1], field[2], field[3]]);
    if ntp == 0 {
        return None;
    }
    match ntp.wrapping_sub(UNIX_OFFSET) {
        0 => None,
        unix => Some(unix),
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SntpClient {
    port: u16,
    /// Last resolved hostname and its address.
    resolved: Option<(String, SocketAddr)>,
}

impl SntpClient {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            resolved: None,
        }
    }

    async fn resolve(&mut self, host: &str) -> SocketAddr {
        if let Some((cached, addr)) = &self.resolved {
            if cached == host {
                return *addr;
            }
        }

        let addr = match lookup_host((host, self.port)).await {
            Ok(mut addrs) => addrs.find(SocketAddr::is_ipv4),
            Err(e) => {
                debug!(host, error = %e, "lookup failed");
                None
            }
        };

        let addr = addr.unwrap_or_else(|| {
            warn!(host, fallback = FALLBACK_HOST, "time server did not resolve, using fallback");
            SocketAddr::new(FALLBACK_ADDR.into(), self.port)
        });
        self.resolved = Some((host.to_string(), addr));
        addr
    }
}

impl Default for SntpClient {
    fn default() -> Self {
        Self::new(DEFAULT_PORT)
    }
}

impl TimeSource for SntpClient {
    async fn query(&mut self, host: &str, timeout: Duration) -> Option<u32> {
        let addr = self.resolve(host).await;

        let socket = match UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "cannot bind SNTP socket");
                return None;
            }
        };

        if let Err(e) = socket.send_to(&request_packet(), addr).await {
            warn!(%addr, error = %e, "SNTP send failed");
            return None;
        }

        let mut buf = [0u8; PACKET_SIZE];
        match tokio::time::timeout(timeout, socket.recv_from(&mut buf)).await {
            Ok(Ok((n, from))) => {
                debug!(%from, bytes = n, "SNTP answer");
                parse_response(&buf[..n])
            }
            Ok(Err(e)) => {
                warn!(%addr, error = %e, "SNTP receive failed");
                None
            }
            Err(_) => {
                debug!(%addr, ?timeout, "SNTP timeout");
                None
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
