// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch loop and the operator-facing handle.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::event::MissionEvent;

use super::Mission;

/// Cloneable handle for pushing operator requests into the dispatch queue.
#[derive(Clone)]
pub struct MissionHandle {
    events: mpsc::Sender<MissionEvent>,
}

impl MissionHandle {
    pub fn new(events: mpsc::Sender<MissionEvent>) -> Self {
        Self { events }
    }

    /// Request Idle → Launch once the pad reports clean.
    pub async fn arm(&self) -> anyhow::Result<()> {
        self.events
            .send(MissionEvent::Arm)
            .await
            .map_err(|_| anyhow::anyhow!("mission loop is gone"))
    }
}

/// Single-consumer dispatch loop over the mission event queue.
pub struct MissionLoop {
    mission: Mission,
    events_rx: mpsc::Receiver<MissionEvent>,
    shutdown: CancellationToken,
}

impl MissionLoop {
    pub fn new(
        mission: Mission,
        events_rx: mpsc::Receiver<MissionEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { mission, events_rx, shutdown }
    }

    /// Run until shutdown is cancelled or every event sender is gone.
    /// Returns the mission so callers can inspect the final state.
    pub async fn run(mut self) -> Mission {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("mission loop shutting down");
                    break;
                }
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.mission.dispatch(event),
                        None => {
                            debug!("event queue closed");
                            break;
                        }
                    }
                }
            }
        }
        self.mission
    }
}
