/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Control-port client.
//!
//! Example:
//!   station-ctl get/countdown
//!   station-ctl 'set/lcd?msg=Land%20ho&r=255&g=0&b=0'
//!   station-ctl --addr 10.0.0.7:8080 set/time?sync_interval=60

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "station-ctl", about = "Send one request to a stationd control port")]
struct Cli {
    /// Control-port address.
    #[arg(short = 'a', long = "addr", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Print the status line and headers as well as the body.
    #[arg(short = 'i', long = "include", default_value_t = false)]
    include_headers: bool,

    /// Request path, with or without the leading '/'.
    path: String,
}

fn request_line(path: &str) -> String {
    if path.starts_with('/') {
        format!("GET {path} HTTP/1.1\r\n\r\n")
    } else {
        format!("GET /{path} HTTP/1.1\r\n\r\n")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut stream = TcpStream::connect(cli.addr)
        .await
        .with_context(|| format!("Cannot connect to {}", cli.addr))?;

    let request = request_line(&cli.path);
    debug!(request = %request.trim_end(), "sending");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .context("Failed to read response")?;

    let (head, body) = response.split_once("\r\n\r\n").unwrap_or(("", response.as_str()));
    if cli.include_headers {
        println!("{head}\n");
    }
    print!("{body}");

    let ok = head.starts_with("HTTP/1.1 200");
    if !ok {
        anyhow::bail!("{}", head.lines().next().unwrap_or("no status line"));
    }
    Ok(())
}
