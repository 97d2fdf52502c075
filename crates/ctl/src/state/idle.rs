// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle: pad-safe initial state. Drives everything closed and waits for an
//! operator to arm the mission.

use tracing::{debug, info};

use crate::frame::Frame;
use crate::hardware::RELAY_DEENERGIZED;
use crate::mission::MissionIo;

use super::MissionState;

#[derive(Debug, Default)]
pub struct Idle;

impl Idle {
    /// Emit a close for every energized relay and every servo away from its
    /// closed position.
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        for (name, relay) in io.registry.relays() {
            if relay.state != RELAY_DEENERGIZED {
                info!(name, "closing energized relay");
                io.send_frame(Frame::relay_release(relay.device_id));
            }
        }
        for (name, servo) in io.registry.servos() {
            if servo.position != servo.closed_pos {
                info!(name, "closing open servo");
                io.send_frame(Frame::servo_close(servo.device_id));
            }
        }
        None
    }

    /// Bounce the frame straight back; Idle keeps no command state to
    /// reconstruct a retry from.
    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(frame.clone());
        None
    }

    /// Operator arm request: leave for Launch when the whole pad reports
    /// closed, otherwise re-emit closes and stay.
    pub fn arm(&mut self, io: &MissionIo) -> Option<MissionState> {
        let mut ready = true;
        for (name, relay) in io.registry.relays() {
            if relay.state != RELAY_DEENERGIZED {
                debug!(name, "arm blocked by energized relay");
                io.send_frame(Frame::relay_release(relay.device_id));
                ready = false;
            }
        }
        for (name, servo) in io.registry.servos() {
            if servo.position != servo.closed_pos {
                debug!(name, "arm blocked by open servo");
                io.send_frame(Frame::servo_close(servo.device_id));
                ready = false;
            }
        }

        if ready {
            info!("pad clean, arming");
            Some(MissionState::Launch(super::Launch::default()))
        } else {
            info!("arm refused: pad not clean");
            None
        }
    }
}

#[cfg(test)]
#[path = "idle_tests.rs"]
mod tests;
