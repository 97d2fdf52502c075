// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot timers, delivered as [`MissionEvent::Timer`] through the same
//! queue as inbound frames.
//!
//! There is no cancellation: a timer scheduled by a state that has since
//! been replaced still fires, and the state active at delivery time decides
//! whether the kind means anything to it.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::event::MissionEvent;

/// The timing checks the mission schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Open the oxidizer main valve, staggered after the fuel main.
    OpenOxidizerMain,
    /// Verify both main-valve acks arrived close together.
    ValveCheck,
    /// Energize the igniter.
    IgniterActivate,
    /// Verify the igniter confirmed before propellant floods the chamber.
    IgniterCheck,
}

/// Schedule `kind` for delivery after `delay`.
pub fn schedule(events: &mpsc::Sender<MissionEvent>, kind: TimerKind, delay: Duration) {
    let events = events.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if events.send(MissionEvent::Timer(kind)).await.is_err() {
            debug!(?kind, "timer fired after dispatch loop shutdown");
        }
    });
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
