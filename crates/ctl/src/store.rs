// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only mission view for pollers: active state, transition sequence,
//! and a registry snapshot. Written only by the dispatch task.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::event::TransitionEvent;
use crate::hardware::RegistrySnapshot;

/// Shared mission state. Cheap to poll at a few hertz from a UI.
pub struct Store {
    state_name: RwLock<&'static str>,
    seq: AtomicU64,
    registry: RwLock<RegistrySnapshot>,
    transitions: broadcast::Sender<TransitionEvent>,
}

/// Point-in-time view of the mission.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSnapshot {
    pub state: &'static str,
    pub seq: u64,
    pub registry: RegistrySnapshot,
}

impl Store {
    pub fn new() -> Self {
        let (transitions, _) = broadcast::channel(64);
        Self {
            state_name: RwLock::new("idle"),
            seq: AtomicU64::new(0),
            registry: RwLock::new(RegistrySnapshot::default()),
            transitions,
        }
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.transitions.subscribe()
    }

    /// Name of the currently active state.
    pub fn state_name(&self) -> &'static str {
        *self.state_name.read()
    }

    /// Current view of state and registry.
    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot {
            state: *self.state_name.read(),
            seq: self.seq.load(Ordering::Acquire),
            registry: self.registry.read().clone(),
        }
    }

    pub(crate) fn record_transition(&self, event: TransitionEvent) {
        *self.state_name.write() = event.next;
        self.seq.store(event.seq, Ordering::Release);
        let _ = self.transitions.send(event);
    }

    pub(crate) fn record_registry(&self, snapshot: RegistrySnapshot) {
        *self.registry.write() = snapshot;
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
