// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP frame transport: one socket, a reader task pumping inbound frames
//! into the dispatch queue, and a writer task draining outbound commands.
//!
//! Frames travel as newline-delimited JSON. Read timeouts are routine and
//! logged at debug; decode failures drop the line; EOF or a hard I/O error
//! cancels the mission.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::event::MissionEvent;
use crate::frame::Frame;

/// Connection settings for the avionics bridge.
#[derive(Debug, Clone)]
pub struct TcpSettings {
    pub addr: SocketAddr,
    /// How long a single read waits before ticking over; not an error.
    pub read_timeout: Duration,
}

/// Connect and spawn the reader/writer pumps.
///
/// Returns the outbound sender; frames pushed into it are flushed to the
/// socket in order. Inbound frames arrive on `events` as
/// [`MissionEvent::Frame`].
pub async fn connect(
    settings: TcpSettings,
    events: mpsc::Sender<MissionEvent>,
    shutdown: CancellationToken,
) -> anyhow::Result<mpsc::Sender<Frame>> {
    let stream = TcpStream::connect(settings.addr)
        .await
        .with_context(|| format!("connecting to avionics bridge at {}", settings.addr))?;
    info!("connected to {}", settings.addr);

    let (read_half, write_half) = stream.into_split();
    let (outbound_tx, outbound_rx) = mpsc::channel(256);

    tokio::spawn(read_loop(read_half, settings.read_timeout, events, shutdown.clone()));
    tokio::spawn(write_loop(write_half, outbound_rx, shutdown));

    Ok(outbound_tx)
}

async fn read_loop(
    read_half: OwnedReadHalf,
    read_timeout: Duration,
    events: mpsc::Sender<MissionEvent>,
    shutdown: CancellationToken,
) {
    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = tokio::time::timeout(read_timeout, lines.next_line()) => {
                match result {
                    Err(_) => debug!("receive timeout"),
                    Ok(Ok(Some(line))) => match serde_json::from_str::<Frame>(&line) {
                        Ok(frame) => {
                            if events.send(MissionEvent::Frame(frame)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("undecodable frame dropped: {e}"),
                    },
                    Ok(Ok(None)) => {
                        info!("transport closed by peer");
                        shutdown.cancel();
                        break;
                    }
                    Ok(Err(e)) => {
                        warn!("transport read error: {e}");
                        shutdown.cancel();
                        break;
                    }
                }
            }
        }
    }
}

async fn write_loop(
    mut write_half: OwnedWriteHalf,
    mut outbound: mpsc::Receiver<Frame>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                let mut line = match serde_json::to_string(&frame) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(%frame, "frame failed to encode: {e}");
                        continue;
                    }
                };
                line.push('\n');
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    warn!("transport send error: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
