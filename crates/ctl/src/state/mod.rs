// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission states as tagged variants, each carrying its own bookkeeping.
//!
//! Handlers receive the shared [`MissionIo`] and return the state to install
//! next, or `None` to stay. The registry update for a FEED frame has always
//! happened before a state sees it; guards read the result through the
//! [`FeedUpdate`] and the registry itself.

pub mod flight;
pub mod fuel;
pub mod heating;
pub mod idle;
pub mod ignition;
pub mod landing;
pub mod launch;

pub use flight::Flight;
pub use fuel::Fuel;
pub use heating::HeatingOxidizer;
pub use idle::Idle;
pub use ignition::Ignition;
pub use landing::Landing;
pub use launch::Launch;

use tracing::{debug, error, info};

use crate::frame::Frame;
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;
use crate::timer::TimerKind;

// Logical device names the mission commands and watches.
pub const FUEL_INTAKE: &str = "fuel_intake";
pub const OXIDIZER_INTAKE: &str = "oxidizer_intake";
pub const FUEL_MAIN: &str = "fuel_main";
pub const OXIDIZER_MAIN: &str = "oxidizer_main";
pub const OXIDIZER_HEATER: &str = "oxidizer_heater";
pub const IGNITER: &str = "igniter";
pub const PARACHUTE: &str = "parachute";
pub const FUEL_LEVEL: &str = "fuel_level";
pub const OXIDIZER_LEVEL: &str = "oxidizer_level";
pub const ALTITUDE: &str = "altitude";
pub const OXIDIZER_PRESSURE: &str = "oxidizer_pressure";

/// The active mission state. Exactly one exists at any time.
#[derive(Debug)]
pub enum MissionState {
    Idle(Idle),
    Launch(Launch),
    Fuel(Fuel),
    HeatingOxidizer(HeatingOxidizer),
    Ignition(Ignition),
    Flight(Flight),
    Landing(Landing),
    Landed,
    Abort,
}

impl MissionState {
    /// The initial state.
    pub fn idle() -> Self {
        Self::Idle(Idle::default())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle(_) => "idle",
            Self::Launch(_) => "launch",
            Self::Fuel(_) => "fuel",
            Self::HeatingOxidizer(_) => "heating_oxidizer",
            Self::Ignition(_) => "ignition",
            Self::Flight(_) => "flight",
            Self::Landing(_) => "landing",
            Self::Landed => "landed",
            Self::Abort => "abort",
        }
    }

    /// Entry hook, run exactly once per transition. May itself request a
    /// further transition (ignition's pressure preconditions do).
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        match self {
            Self::Idle(state) => state.enter(io),
            Self::Launch(state) => state.enter(io),
            Self::Fuel(state) => state.enter(io),
            Self::HeatingOxidizer(state) => state.enter(io),
            Self::Ignition(state) => state.enter(io),
            Self::Flight(_) => None,
            Self::Landing(state) => state.enter(io),
            Self::Landed => {
                info!("touchdown confirmed, mission complete");
                None
            }
            Self::Abort => {
                error!("mission aborted, commanding stopped");
                None
            }
        }
    }

    /// State-specific FEED guard, run after the registry update.
    pub fn on_feed(&mut self, io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        match self {
            Self::Launch(state) => state.on_feed(io, update),
            Self::Fuel(state) => state.on_feed(io, update),
            Self::HeatingOxidizer(state) => state.on_feed(io, update),
            Self::Ignition(state) => state.on_feed(io, update),
            Self::Flight(state) => state.on_feed(io, update),
            Self::Landing(state) => state.on_feed(io, update),
            Self::Idle(_) | Self::Landed | Self::Abort => None,
        }
    }

    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        match self {
            Self::Launch(state) => state.on_ack(io, frame),
            Self::Fuel(state) => state.on_ack(io, frame),
            Self::HeatingOxidizer(state) => state.on_ack(io, frame),
            Self::Ignition(state) => state.on_ack(io, frame),
            Self::Landing(state) => state.on_ack(io, frame),
            Self::Idle(_) | Self::Flight(_) | Self::Landed | Self::Abort => None,
        }
    }

    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        match self {
            Self::Idle(state) => state.on_nack(io, frame),
            Self::Launch(state) => state.on_nack(io, frame),
            Self::Fuel(state) => state.on_nack(io, frame),
            Self::HeatingOxidizer(state) => state.on_nack(io, frame),
            Self::Ignition(state) => state.on_nack(io, frame),
            Self::Landing(state) => state.on_nack(io, frame),
            Self::Flight(_) | Self::Landed | Self::Abort => {
                debug!(%frame, "nack ignored in terminal or passive state");
                None
            }
        }
    }

    /// SERVICE frames are commands *to* devices; nothing here consumes them.
    pub fn on_service(&mut self, _io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        debug!(%frame, "service frame ignored");
        None
    }

    pub fn on_timer(&mut self, io: &MissionIo, kind: TimerKind) -> Option<MissionState> {
        match self {
            Self::Ignition(state) => state.on_timer(io, kind),
            _ => {
                debug!(?kind, state = self.name(), "timer ignored outside its state");
                None
            }
        }
    }

    /// Operator arm request; only Idle responds.
    pub fn arm(&mut self, io: &MissionIo) -> Option<MissionState> {
        match self {
            Self::Idle(state) => state.arm(io),
            _ => {
                debug!(state = self.name(), "arm ignored outside idle");
                None
            }
        }
    }
}
