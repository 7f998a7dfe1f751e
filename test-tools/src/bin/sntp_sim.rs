/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! SNTP server simulator.
//!
//! Answers every 48-byte request with the host's current time shifted by
//! `--offset` seconds.  `--drop N` ignores the first N requests so the
//! station's retry path and its "time inaccurate" state can be exercised.
//!
//! Example:
//!   sntp-sim --bind 127.0.0.1:1123 --offset -30 --drop 2
//!   stationd -c station.yaml     # with sync.port: 1123, ntp server 127.0.0.1

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use stationd::sync::sntp::{response_packet, PACKET_SIZE};

#[derive(Debug, Parser)]
#[command(name = "sntp-sim", about = "SNTP server simulator for stationd")]
struct Cli {
    /// UDP address to answer on.
    #[arg(short = 'b', long = "bind", default_value = "127.0.0.1:1123")]
    bind: SocketAddr,

    /// Seconds added to the host clock in every answer.
    #[arg(short = 'o', long = "offset", default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// Number of initial requests to ignore.
    #[arg(short = 'd', long = "drop", default_value_t = 0)]
    drop: u32,
}

fn host_epoch(offset: i64) -> Result<u32> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("host clock is before 1970")?
        .as_secs() as i64;
    u32::try_from(now + offset).context("shifted time does not fit in 32 bits")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let socket = UdpSocket::bind(cli.bind)
        .await
        .with_context(|| format!("Cannot bind {}", cli.bind))?;
    info!(bind = %cli.bind, offset = cli.offset, drop = cli.drop, "sntp-sim ready");

    let mut buf = [0u8; PACKET_SIZE];
    let mut dropped = 0u32;
    loop {
        let (n, peer) = socket.recv_from(&mut buf).await?;
        if n < PACKET_SIZE {
            warn!(%peer, bytes = n, "short request ignored");
            continue;
        }
        if dropped < cli.drop {
            dropped += 1;
            info!(%peer, dropped, "request dropped");
            continue;
        }

        let epoch = host_epoch(cli.offset)?;
        socket.send_to(&response_packet(epoch), peer).await?;
        debug!(%peer, epoch, "answered");
    }
}
