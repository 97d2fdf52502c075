// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fuel loading: mirror of the oxidizer pass, but the handover to heating
//! waits for the hardware to confirm the intake closed rather than for a
//! pressure reading.

use tracing::{info, warn};

use crate::frame::{DeviceKind, Frame, Operation, SERVO_CLOSED, SERVO_OPEN};
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;

use super::{MissionState, FUEL_INTAKE, FUEL_LEVEL};

#[derive(Debug)]
pub struct Fuel {
    fueling: bool,
    target_level: f64,
}

impl Default for Fuel {
    fn default() -> Self {
        Self { fueling: false, target_level: 100.0 }
    }
}

impl Fuel {
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        let Some(id) = io.registry.servo_id(FUEL_INTAKE) else {
            warn!("{FUEL_INTAKE} missing from registry, cannot load fuel");
            return None;
        };
        io.send_frame(Frame::servo_position(id, SERVO_OPEN));
        self.fueling = true;
        None
    }

    pub fn on_feed(&mut self, io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        if update.kind == DeviceKind::Sensor
            && update.name == FUEL_LEVEL
            && self.fueling
            && update.value >= self.target_level
        {
            info!(level = update.value, "fuel tank full, closing intake");
            if let Some(id) = io.registry.servo_id(FUEL_INTAKE) {
                io.send_frame(Frame::servo_position(id, SERVO_CLOSED));
            }
            self.fueling = false;
        }
        None
    }

    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        if frame.device_kind == DeviceKind::Servo
            && Some(frame.device_id) == io.registry.servo_id(FUEL_INTAKE)
            && frame.operation == Operation::Position
            && frame.payload.first().copied() == Some(SERVO_CLOSED)
        {
            info!("fuel intake confirmed closed, heating oxidizer");
            return Some(MissionState::HeatingOxidizer(super::HeatingOxidizer::default()));
        }
        None
    }

    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(Frame::retry(frame, Vec::new()));
        None
    }
}

#[cfg(test)]
#[path = "fuel_tests.rs"]
mod tests;
