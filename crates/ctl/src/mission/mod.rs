// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission context: the single place state and registry mutate. Every
//! inbound frame, timer expiration, and operator request funnels through
//! [`Mission::dispatch`] on one task.

pub mod run;

pub use run::{MissionHandle, MissionLoop};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::event::{MissionEvent, TransitionEvent};
use crate::frame::{Action, Frame};
use crate::hardware::Registry;
use crate::state::MissionState;
use crate::store::Store;
use crate::timer::{self, TimerKind};

/// What states get to act through: registry reads, frame emission, and timer
/// scheduling. Registry writes stay with [`Mission`].
pub struct MissionIo {
    pub registry: Registry,
    outbound: mpsc::Sender<Frame>,
    events: mpsc::Sender<MissionEvent>,
}

impl MissionIo {
    pub fn new(
        registry: Registry,
        outbound: mpsc::Sender<Frame>,
        events: mpsc::Sender<MissionEvent>,
    ) -> Self {
        Self { registry, outbound, events }
    }

    /// Queue a frame for the transport. A refused frame is logged and
    /// dropped; higher layers retry off NACKs, not send failures.
    pub fn send_frame(&self, frame: Frame) {
        debug!(%frame, "sending frame");
        if let Err(e) = self.outbound.try_send(frame) {
            warn!("outbound queue refused frame: {e}");
        }
    }

    /// Schedule a one-shot timer delivered through the dispatch queue.
    pub fn schedule(&self, kind: TimerKind, delay: Duration) {
        timer::schedule(&self.events, kind, delay);
    }
}

/// Owns the registry, the active state, and the observability store.
pub struct Mission {
    io: MissionIo,
    state: MissionState,
    seq: u64,
    store: Arc<Store>,
}

impl Mission {
    /// Build the mission and enter Idle, running its entry hook once.
    pub fn new(
        registry: Registry,
        outbound: mpsc::Sender<Frame>,
        events: mpsc::Sender<MissionEvent>,
        store: Arc<Store>,
    ) -> Self {
        let mut mission = Self {
            io: MissionIo::new(registry, outbound, events),
            state: MissionState::idle(),
            seq: 0,
            store,
        };
        mission.store.record_registry(mission.io.registry.snapshot());
        info!(state = mission.state.name(), "mission initialized");
        if let Some(next) = mission.state.enter(&mission.io) {
            mission.transition_to(next);
        }
        mission
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn registry(&self) -> &Registry {
        &self.io.registry
    }

    /// Process one event. Never panics back into the loop; every failure
    /// path reduces to a log line or a state's own abort edge.
    pub fn dispatch(&mut self, event: MissionEvent) {
        match event {
            MissionEvent::Frame(frame) => self.dispatch_frame(frame),
            MissionEvent::Timer(kind) => {
                debug!(?kind, "timer fired");
                if let Some(next) = self.state.on_timer(&self.io, kind) {
                    self.transition_to(next);
                }
            }
            MissionEvent::Arm => {
                info!("arm requested");
                if let Some(next) = self.state.arm(&self.io) {
                    self.transition_to(next);
                }
            }
        }
        self.store.record_registry(self.io.registry.snapshot());
    }

    fn dispatch_frame(&mut self, frame: Frame) {
        debug!(%frame, "frame received");
        let next = match frame.action {
            Action::Feed => {
                // Registry update first; the guard sees the stored result.
                match self.io.registry.apply_feed(&frame) {
                    Some(update) => self.state.on_feed(&self.io, &update),
                    None => None,
                }
            }
            Action::Ack => self.state.on_ack(&self.io, &frame),
            Action::Nack => {
                warn!(%frame, "nack received");
                self.state.on_nack(&self.io, &frame)
            }
            Action::Service => self.state.on_service(&self.io, &frame),
        };
        if let Some(next) = next {
            self.transition_to(next);
        }
    }

    /// Install a new state and run its entry hook exactly once. Entry hooks
    /// may request a further transition (ignition's pressure preconditions),
    /// so this loops until a state settles.
    fn transition_to(&mut self, next: MissionState) {
        let mut next = next;
        loop {
            let prev = self.state.name();
            self.seq += 1;
            info!(prev, next = next.name(), seq = self.seq, "state transition");
            self.state = next;
            self.store.record_transition(TransitionEvent {
                prev,
                next: self.state.name(),
                seq: self.seq,
            });
            match self.state.enter(&self.io) {
                Some(another) => next = another,
                None => break,
            }
        }
    }
}

#[cfg(test)]
#[path = "../mission_tests.rs"]
mod tests;
