/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The main loop and the control-port transport.
//!
//! Everything runs on one task.  Each iteration either polls the device
//! (clock, heartbeat, countdown) or serves one accepted connection to
//! completion.  A slow client therefore pauses the countdown until it is
//! done; requests are tiny and rare, so that is accepted.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::protocol::{
    parse_request_line, BufferLimits, Feed, LineBuffer, ProtocolError, Response, StatusCode,
};
use crate::store::PersistentStore;
use crate::sync::{TickSource, TimeSource};

const READ_CHUNK: usize = 64;

// ── Connection ────────────────────────────────────────────────────────────────

/// Reads one request line from `stream`, answers it and closes the stream.
///
/// Returns the status sent.  I/O errors abort the connection without a
/// response.
pub async fn serve_connection<T, S>(
    stream: &mut T,
    device: &mut Device<S>,
    limits: BufferLimits,
) -> io::Result<StatusCode>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: PersistentStore,
{
    let mut line = LineBuffer::new(limits);
    let mut chunk = [0u8; READ_CHUNK];

    let response = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            let err = ProtocolError::BadRequest("connection closed before end of request line".into());
            debug!(error = %err, "incomplete request");
            break Response::from(&err);
        }

        match line.push(&chunk[..n]) {
            Feed::NeedMore => continue,
            Feed::TooLarge => {
                let err = ProtocolError::PayloadTooLarge { limit: limits.max };
                debug!(error = %err, "request rejected");
                break Response::from(&err);
            }
            Feed::Line(bytes) => {
                break match parse_request_line(&bytes) {
                    Ok(path) => {
                        debug!(path = %String::from_utf8_lossy(&path), "request");
                        device.handle(&path)
                    }
                    Err(e) => {
                        debug!(error = %e, "malformed request line");
                        Response::from(&e)
                    }
                };
            }
        }
    };

    stream.write_all(&response.to_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;
    Ok(response.status)
}

// ── Station ───────────────────────────────────────────────────────────────────

pub struct Station<S, T, K>
where
    S: PersistentStore,
    T: TimeSource,
    K: TickSource,
{
    device: Device<S>,
    listener: TcpListener,
    source: T,
    ticks: K,
    poll_interval: Duration,
    limits: BufferLimits,
}

impl<S, T, K> Station<S, T, K>
where
    S: PersistentStore,
    T: TimeSource,
    K: TickSource,
{
    pub fn new(
        device: Device<S>,
        listener: TcpListener,
        source: T,
        ticks: K,
        poll_interval: Duration,
        limits: BufferLimits,
    ) -> Self {
        Self {
            device,
            listener,
            source,
            ticks,
            poll_interval,
            limits,
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the loop until `shutdown` resolves, then hands the device back.
    pub async fn run<F>(self, shutdown: F) -> Device<S>
    where
        F: Future<Output = ()>,
    {
        let Station {
            mut device,
            listener,
            mut source,
            ticks,
            poll_interval,
            limits,
        } = self;

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(addr = ?listener.local_addr().ok(), ?poll_interval, "station running");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    device.poll(&ticks, &mut source).await;
                }
                accepted = listener.accept() => match accepted {
                    Ok((mut stream, peer)) => {
                        match serve_connection(&mut stream, &mut device, limits).await {
                            Ok(status) => info!(%peer, status = status.code(), "request served"),
                            Err(e) => warn!(%peer, error = %e, "connection aborted"),
                        }
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }

        device
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
