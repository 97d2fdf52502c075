// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `missionctl` binary and talk
//! to it over a loopback TCP socket, playing the avionics bridge.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use missionctl_specs::MissionProcess;

const TIMEOUT: Duration = Duration::from_secs(10);

async fn accept_mission(
    arm: bool,
) -> anyhow::Result<(MissionProcess, TcpStream)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let mission = MissionProcess::start(listener.local_addr()?, arm)?;
    let (stream, _) = tokio::time::timeout(TIMEOUT, listener.accept()).await??;
    Ok((mission, stream))
}

async fn read_json_line(
    lines: &mut tokio::io::Lines<BufReader<tokio::net::tcp::OwnedReadHalf>>,
) -> anyhow::Result<serde_json::Value> {
    let line = tokio::time::timeout(TIMEOUT, lines.next_line())
        .await??
        .ok_or_else(|| anyhow::anyhow!("mission closed the connection"))?;
    Ok(serde_json::from_str(&line)?)
}

#[tokio::test]
async fn armed_mission_opens_the_oxidizer_intake() -> anyhow::Result<()> {
    let (_mission, stream) = accept_mission(true).await?;
    let (read_half, _write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let frame = read_json_line(&mut lines).await?;
    assert_eq!(frame["source"], "rocket");
    assert_eq!(frame["destination"], "software");
    assert_eq!(frame["action"], "service");
    assert_eq!(frame["device_kind"], "servo");
    assert_eq!(frame["device_id"], 1);
    assert_eq!(frame["operation"], "position");
    assert_eq!(frame["payload"][0], 0.0);

    Ok(())
}

#[tokio::test]
async fn full_oxidizer_tank_closes_the_intake() -> anyhow::Result<()> {
    let (_mission, stream) = accept_mission(true).await?;
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // the arm-driven intake open
    let frame = read_json_line(&mut lines).await?;
    assert_eq!(frame["device_id"], 1);

    // garbage must not kill the pump
    write_half.write_all(b"{not json}\n").await?;

    let feed = serde_json::json!({
        "source": "software", "destination": "rocket", "priority": "low",
        "action": "feed", "device_kind": "sensor", "device_id": 1,
        "data_type": "float", "operation": "position", "payload": [100.0],
    });
    write_half
        .write_all(format!("{feed}\n").as_bytes())
        .await?;

    let frame = read_json_line(&mut lines).await?;
    assert_eq!(frame["action"], "service");
    assert_eq!(frame["device_kind"], "servo");
    assert_eq!(frame["device_id"], 1);
    assert_eq!(frame["payload"][0], 100.0);

    Ok(())
}

#[tokio::test]
async fn bridge_disconnect_shuts_the_mission_down() -> anyhow::Result<()> {
    let (mut mission, stream) = accept_mission(false).await?;
    drop(stream);

    let code = tokio::task::spawn_blocking(move || {
        let code = mission.wait_exit(TIMEOUT);
        drop(mission);
        code
    })
    .await??;
    assert_eq!(code, Some(0));
    Ok(())
}
