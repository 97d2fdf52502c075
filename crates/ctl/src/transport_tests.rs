// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::frame::{Action, DeviceKind};

async fn loopback() -> anyhow::Result<(TcpSettings, TcpListener)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let settings = TcpSettings {
        addr: listener.local_addr()?,
        read_timeout: Duration::from_millis(50),
    };
    Ok((settings, listener))
}

#[tokio::test]
async fn inbound_lines_become_frame_events() -> anyhow::Result<()> {
    let (settings, listener) = loopback().await?;
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let _outbound = connect(settings, events_tx, shutdown.clone()).await?;
    let (mut peer, _) = listener.accept().await?;

    let feed = Frame {
        source: crate::frame::Board::Software,
        destination: crate::frame::Board::Rocket,
        priority: crate::frame::Priority::Low,
        action: Action::Feed,
        device_kind: DeviceKind::Sensor,
        device_id: 2,
        data_type: crate::frame::DataType::Float,
        operation: crate::frame::Operation::Position,
        payload: vec![42.0],
    };
    let mut line = serde_json::to_string(&feed)?;
    line.push('\n');
    peer.write_all(line.as_bytes()).await?;

    let event = tokio::time::timeout(Duration::from_secs(5), events_rx.recv()).await?;
    match event {
        Some(MissionEvent::Frame(frame)) => assert_eq!(frame, feed),
        other => anyhow::bail!("unexpected event: {other:?}"),
    }

    shutdown.cancel();
    Ok(())
}

#[tokio::test]
async fn garbage_lines_are_dropped_without_killing_the_pump() -> anyhow::Result<()> {
    let (settings, listener) = loopback().await?;
    let (events_tx, mut events_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let _outbound = connect(settings, events_tx, shutdown.clone()).await?;
    let (mut peer, _) = listener.accept().await?;

    peer.write_all(b"{not json}\n").await?;
    let feed = Frame::servo_position(1, 0.0);
    let mut line = serde_json::to_string(&feed)?;
    line.push('\n');
    peer.write_all(line.as_bytes()).await?;

    let event = tokio::time::timeout(Duration::from_secs(5), events_rx.recv()).await?;
    assert!(matches!(event, Some(MissionEvent::Frame(_))));

    shutdown.cancel();
    Ok(())
}

#[tokio::test]
async fn outbound_frames_are_written_as_json_lines() -> anyhow::Result<()> {
    let (settings, listener) = loopback().await?;
    let (events_tx, _events_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let outbound = connect(settings, events_tx, shutdown.clone()).await?;
    let (peer, _) = listener.accept().await?;

    outbound.send(Frame::relay_open(1)).await?;

    let mut lines = BufReader::new(peer).lines();
    let line = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await??
        .ok_or_else(|| anyhow::anyhow!("peer saw EOF before the frame"))?;
    let frame: Frame = serde_json::from_str(&line)?;
    assert_eq!(frame, Frame::relay_open(1));

    shutdown.cancel();
    Ok(())
}

#[tokio::test]
async fn peer_eof_cancels_the_mission() -> anyhow::Result<()> {
    let (settings, listener) = loopback().await?;
    let (events_tx, _events_rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();

    let _outbound = connect(settings, events_tx, shutdown.clone()).await?;
    let (peer, _) = listener.accept().await?;
    drop(peer);

    tokio::time::timeout(Duration::from_secs(5), shutdown.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn connect_to_dead_endpoint_fails() -> anyhow::Result<()> {
    let (settings, listener) = loopback().await?;
    drop(listener);

    let (events_tx, _events_rx) = mpsc::channel(16);
    let result = connect(settings, events_tx, CancellationToken::new()).await;
    assert!(result.is_err());
    Ok(())
}
