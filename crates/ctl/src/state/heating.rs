// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Oxidizer heating: raise tank pressure to ignition range with the heater
//! relay, then hand over once the hardware confirms the heater is off.

use tracing::{info, warn};

use crate::frame::{DeviceKind, Frame, Operation};
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;

use super::{MissionState, OXIDIZER_HEATER, OXIDIZER_PRESSURE};

#[derive(Debug)]
pub struct HeatingOxidizer {
    heating: bool,
    target_pressure: f64,
}

impl Default for HeatingOxidizer {
    fn default() -> Self {
        Self { heating: false, target_pressure: 65.0 }
    }
}

impl HeatingOxidizer {
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        let Some(id) = io.registry.relay_id(OXIDIZER_HEATER) else {
            warn!("{OXIDIZER_HEATER} missing from registry, cannot heat");
            return None;
        };
        io.send_frame(Frame::relay_open(id));
        None
    }

    pub fn on_feed(&mut self, io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        if update.kind == DeviceKind::Sensor
            && update.name == OXIDIZER_PRESSURE
            && self.heating
            && update.value >= self.target_pressure
        {
            info!(pressure = update.value, "target pressure reached, heater off");
            if let Some(id) = io.registry.relay_id(OXIDIZER_HEATER) {
                io.send_frame(Frame::relay_close(id));
            }
        }
        None
    }

    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        if frame.device_kind != DeviceKind::Relay
            || Some(frame.device_id) != io.registry.relay_id(OXIDIZER_HEATER)
        {
            return None;
        }
        match frame.operation {
            Operation::Open => {
                self.heating = true;
                None
            }
            Operation::Close => {
                info!("heater confirmed off, proceeding to ignition");
                Some(MissionState::Ignition(super::Ignition::default()))
            }
            Operation::Position => None,
        }
    }

    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(Frame::retry(frame, Vec::new()));
        None
    }
}

#[cfg(test)]
#[path = "heating_tests.rs"]
mod tests;
