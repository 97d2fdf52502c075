// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descent under parachute until the altimeter reads ground.

use tracing::info;

use crate::frame::{DeviceKind, Frame};
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;

use super::{MissionState, ALTITUDE, PARACHUTE};

#[derive(Debug, Default)]
pub struct Landing {
    parachute_deployed: bool,
    landing_complete: bool,
}

impl Landing {
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        if let Some(id) = io.registry.relay_id(PARACHUTE) {
            io.send_frame(Frame::relay_open(id));
        } else {
            tracing::warn!("{PARACHUTE} missing from registry");
        }
        None
    }

    pub fn on_feed(&mut self, _io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        if update.kind == DeviceKind::Sensor && update.name == ALTITUDE && update.value <= 0.0 {
            self.landing_complete = true;
            info!("ground altitude reached");
            return Some(MissionState::Landed);
        }
        None
    }

    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        if frame.device_kind == DeviceKind::Relay
            && Some(frame.device_id) == io.registry.relay_id(PARACHUTE)
        {
            self.parachute_deployed = true;
            info!("parachute deployed");
        }
        None
    }

    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(Frame::retry(frame, Vec::new()));
        None
    }
}

#[cfg(test)]
#[path = "landing_tests.rs"]
mod tests;
