// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch: oxidizer loading. The intake stays open until the tank reports
//! full, then the state waits for tank pressure to settle near the transfer
//! target before handing over to fuel loading.

use tracing::{debug, info, warn};

use crate::frame::{DeviceKind, Frame, Operation, SERVO_CLOSED, SERVO_OPEN};
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;

use super::{MissionState, OXIDIZER_INTAKE, OXIDIZER_LEVEL, OXIDIZER_PRESSURE};

const PRESSURE_BAND: f64 = 5.0;

#[derive(Debug)]
pub struct Launch {
    oxidizer_fueling: bool,
    fueling_complete: bool,
    target_level: f64,
    target_pressure: f64,
}

impl Default for Launch {
    fn default() -> Self {
        Self {
            oxidizer_fueling: false,
            fueling_complete: false,
            target_level: 100.0,
            target_pressure: 30.0,
        }
    }
}

impl Launch {
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        let Some(id) = io.registry.servo_id(OXIDIZER_INTAKE) else {
            warn!("{OXIDIZER_INTAKE} missing from registry, cannot load oxidizer");
            return None;
        };
        io.send_frame(Frame::servo_position(id, SERVO_OPEN));
        self.oxidizer_fueling = true;
        None
    }

    pub fn on_feed(&mut self, io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        if update.kind != DeviceKind::Sensor {
            return None;
        }
        match update.name.as_str() {
            OXIDIZER_LEVEL if self.oxidizer_fueling && update.value >= self.target_level => {
                info!(level = update.value, "oxidizer tank full, closing intake");
                if let Some(id) = io.registry.servo_id(OXIDIZER_INTAKE) {
                    io.send_frame(Frame::servo_position(id, SERVO_CLOSED));
                }
                None
            }
            OXIDIZER_PRESSURE
                if self.fueling_complete
                    && (update.value - self.target_pressure).abs() < PRESSURE_BAND =>
            {
                info!(pressure = update.value, "oxidizer settled, starting fuel load");
                Some(MissionState::Fuel(super::Fuel::default()))
            }
            _ => None,
        }
    }

    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        // Close-intake confirmed: the oxidizer side is done loading and the
        // pressure guard may now fire.
        if frame.device_kind == DeviceKind::Servo
            && Some(frame.device_id) == io.registry.servo_id(OXIDIZER_INTAKE)
            && frame.operation == Operation::Position
            && frame.payload.first().copied() == Some(SERVO_CLOSED)
        {
            debug!("oxidizer intake confirmed closed");
            self.fueling_complete = true;
        }
        None
    }

    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(Frame::retry(frame, Vec::new()));
        None
    }
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
