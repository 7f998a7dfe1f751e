/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use stationd::config::StationConfig;
use stationd::device::Device;
use stationd::display::LogDisplay;
use stationd::net::HostNetwork;
use stationd::server::Station;
use stationd::store::{FileStore, MemoryStore, PersistentStore, DEFAULT_CAPACITY};
use stationd::sync::{MonotonicTicks, SntpClient};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Countdown station daemon.
///
/// Example:
///   stationd -c station.yaml -s /var/lib/stationd/store.bin -l 0.0.0.0:8080
#[derive(Debug, Parser)]
#[command(
    name = "stationd",
    version,
    about = "Countdown station control plane",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Control-port listen address (overrides the configuration file).
    #[arg(short = 'l', long = "listen")]
    listen: Option<SocketAddr>,

    /// Backing file for the persistent store (overrides the configuration file).
    #[arg(short = 's', long = "store")]
    store: Option<PathBuf>,

    /// Restore factory defaults before loading the store.
    #[arg(short = 'r', long = "reset", default_value_t = false)]
    reset: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    info!("stationd {} starting up...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match StationConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using defaults");
            StationConfig::default()
        }
    };
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }

    info!(
        listen        = %config.listen,
        store         = ?config.store_path,
        poll_ms       = config.poll_interval.as_millis() as u64,
        min_buffer    = config.buffer.min,
        max_buffer    = config.buffer.max,
        sync_tries    = config.device.policy.max_tries,
        sync_every    = config.device.cadence.sync_every,
        persist_every = config.device.cadence.persist_every,
        reset         = cli.reset,
        "Configuration"
    );

    // ── Open the store ────────────────────────────────────────────────────────
    let result = match &config.store_path {
        Some(path) => match FileStore::open(path, DEFAULT_CAPACITY) {
            Ok(store) => run(store, config, cli.reset).await,
            Err(e) => {
                error!("Cannot open store {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            warn!("No store path configured, settings will not survive a restart");
            run(MemoryStore::new(DEFAULT_CAPACITY), config, cli.reset).await
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run<S: PersistentStore>(store: S, config: StationConfig, reset: bool) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut device = Device::boot(store, config.device, Box::new(LogDisplay::new()), reset)
        .context("Failed to initialise the store")?;

    let ticks = MonotonicTicks::new();
    let mut source = SntpClient::new(config.sntp_port);
    device.start(&ticks, &mut source, &mut HostNetwork).await;

    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("Cannot bind control port {}", config.listen))?;
    info!("Control port listening on {}", config.listen);

    let station = Station::new(
        device,
        listener,
        source,
        ticks,
        config.poll_interval,
        config.buffer,
    );
    station
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("stationd stopped");
    Ok(())
}
