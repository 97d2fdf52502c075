// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level mission runner — shared by `main` and integration tests.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::hardware::{HardwareConfig, Registry};
use crate::mission::{Mission, MissionHandle, MissionLoop};
use crate::store::Store;
use crate::transport::{self, TcpSettings};

/// A fully-wired mission ready to run.
///
/// Returned by [`prepare`] so callers can reach the [`Store`] and the
/// operator handle before entering the dispatch loop.
pub struct PreparedMission {
    pub store: Arc<Store>,
    pub handle: MissionHandle,
    pub shutdown: CancellationToken,
    mission_loop: MissionLoop,
}

impl PreparedMission {
    /// Run the dispatch loop to completion and return the final mission.
    pub async fn run(self) -> Mission {
        self.mission_loop.run().await
    }
}

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    // Priority: --log-level / MISSIONCTL_LOG_LEVEL > RUST_LOG > default ("info").
    let filter = if std::env::var("MISSIONCTL_LOG_LEVEL").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

/// Prepare a mission: load the hardware config, connect the transport, and
/// enter Idle.
pub async fn prepare(config: &Config) -> anyhow::Result<PreparedMission> {
    let hardware = HardwareConfig::load(&config.config)?;
    let registry = Registry::from_config(&hardware)?;

    let shutdown = CancellationToken::new();
    let (events_tx, events_rx) = mpsc::channel(256);
    let settings = TcpSettings { addr: config.endpoint_addr()?, read_timeout: config.tick() };
    let outbound = transport::connect(settings, events_tx.clone(), shutdown.clone()).await?;

    let store = Arc::new(Store::new());
    let mission = Mission::new(registry, outbound, events_tx.clone(), Arc::clone(&store));
    let handle = MissionHandle::new(events_tx);
    let mission_loop = MissionLoop::new(mission, events_rx, shutdown.clone());

    Ok(PreparedMission { store, handle, shutdown, mission_loop })
}

/// Run a mission to completion.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);

    let prepared = prepare(&config).await?;
    spawn_signal_handler(prepared.shutdown.clone());

    if config.arm {
        prepared.handle.arm().await?;
    }

    let mission = prepared.run().await;
    info!(state = mission.state_name(), "mission ended");
    Ok(())
}

/// First SIGTERM/SIGINT cancels the mission loop; a second force-exits.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM again, forcing exit");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT again, forcing exit");
            }
        }
        std::process::exit(130);
    });
}
