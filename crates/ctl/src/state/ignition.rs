// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ignition: the safety-critical window. Both main valves must confirm open
//! within a tight skew before the igniter fires; any miss aborts rather than
//! risking a flooded chamber.
//!
//! Sequence from entry (all offsets scheduled as one-shot timers through the
//! dispatch queue):
//!   t+0.0  open fuel main
//!   t+0.2  open oxidizer main
//!   t+0.9  valve check — both acks present, skew ≤ 1 s, else abort
//!   +0.3   igniter on (from a passing valve check)
//!   +1.0   igniter check — ack present, else abort
//! Lift-off is confirmed by the first positive altitude sample after the
//! igniter ack.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::frame::{DeviceKind, Frame, SERVO_OPEN};
use crate::hardware::FeedUpdate;
use crate::mission::MissionIo;
use crate::timer::TimerKind;

use super::{MissionState, ALTITUDE, FUEL_MAIN, IGNITER, OXIDIZER_MAIN, OXIDIZER_PRESSURE};

const MIN_PRESSURE: f64 = 40.0;
const MAX_PRESSURE: f64 = 65.0;
const OXIDIZER_MAIN_DELAY: Duration = Duration::from_millis(200);
const VALVE_CHECK_DELAY: Duration = Duration::from_millis(900);
const IGNITER_DELAY: Duration = Duration::from_millis(300);
const IGNITER_CHECK_DELAY: Duration = Duration::from_millis(1000);
const MAX_VALVE_SKEW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct Ignition {
    igniter_on: bool,
    ignition_successful: bool,
    fuel_valve_opened: bool,
    oxidizer_valve_opened: bool,
    fuel_ack_time: Option<Instant>,
    oxidizer_ack_time: Option<Instant>,
    igniter_time: Option<Instant>,
}

fn skew(a: Instant, b: Instant) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

impl Ignition {
    /// Pressure preconditions, then the staged valve-opening sequence.
    pub fn enter(&mut self, io: &MissionIo) -> Option<MissionState> {
        let pressure = io.registry.sensor(OXIDIZER_PRESSURE);
        if pressure < MIN_PRESSURE {
            warn!(pressure, "oxidizer pressure below ignition range, re-heating");
            return Some(MissionState::HeatingOxidizer(super::HeatingOxidizer::default()));
        }
        if pressure > MAX_PRESSURE {
            error!(pressure, "oxidizer pressure above ignition range, aborting");
            return Some(MissionState::Abort);
        }

        if let Some(id) = io.registry.servo_id(FUEL_MAIN) {
            io.send_frame(Frame::servo_position(id, SERVO_OPEN));
        } else {
            warn!("{FUEL_MAIN} missing from registry");
        }
        io.schedule(TimerKind::OpenOxidizerMain, OXIDIZER_MAIN_DELAY);
        io.schedule(TimerKind::ValveCheck, VALVE_CHECK_DELAY);
        None
    }

    pub fn on_timer(&mut self, io: &MissionIo, kind: TimerKind) -> Option<MissionState> {
        match kind {
            TimerKind::OpenOxidizerMain => {
                if let Some(id) = io.registry.servo_id(OXIDIZER_MAIN) {
                    io.send_frame(Frame::servo_position(id, SERVO_OPEN));
                }
                None
            }
            TimerKind::ValveCheck => self.check_valve_timing(io),
            TimerKind::IgniterActivate => {
                self.activate_igniter(io);
                None
            }
            TimerKind::IgniterCheck => self.check_igniter_timing(),
        }
    }

    fn check_valve_timing(&mut self, io: &MissionIo) -> Option<MissionState> {
        match (self.fuel_ack_time, self.oxidizer_ack_time) {
            (Some(fuel), Some(oxidizer)) if skew(fuel, oxidizer) <= MAX_VALVE_SKEW => {
                info!("main valves confirmed in window, firing igniter");
                io.schedule(TimerKind::IgniterActivate, IGNITER_DELAY);
                io.schedule(TimerKind::IgniterCheck, IGNITER_CHECK_DELAY);
                None
            }
            (Some(fuel), Some(oxidizer)) => {
                let skew_ms = skew(fuel, oxidizer).as_millis() as u64;
                error!(skew_ms, "main valve skew too large, aborting");
                Some(MissionState::Abort)
            }
            _ => {
                error!(
                    fuel = self.fuel_valve_opened,
                    oxidizer = self.oxidizer_valve_opened,
                    "main valve ack missing at check time, aborting"
                );
                Some(MissionState::Abort)
            }
        }
    }

    fn activate_igniter(&mut self, io: &MissionIo) {
        if self.igniter_on {
            return;
        }
        if let Some(id) = io.registry.relay_id(IGNITER) {
            io.send_frame(Frame::relay_open(id));
        } else {
            warn!("{IGNITER} missing from registry");
        }
    }

    fn check_igniter_timing(&mut self) -> Option<MissionState> {
        match self.igniter_time {
            None => {
                error!("igniter did not confirm in time, flooding risk, aborting");
                Some(MissionState::Abort)
            }
            Some(at) => {
                let confirmed_ms = at.elapsed().as_millis() as u64;
                info!(confirmed_ms, "igniter confirmed, awaiting lift-off");
                None
            }
        }
    }

    /// Record ack timestamps for the two main valves and the igniter.
    pub fn on_ack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        let now = Instant::now();
        match frame.device_kind {
            DeviceKind::Servo => {
                if Some(frame.device_id) == io.registry.servo_id(FUEL_MAIN) {
                    self.fuel_ack_time = Some(now);
                    self.fuel_valve_opened = true;
                } else if Some(frame.device_id) == io.registry.servo_id(OXIDIZER_MAIN) {
                    self.oxidizer_ack_time = Some(now);
                    self.oxidizer_valve_opened = true;
                }
            }
            DeviceKind::Relay => {
                if Some(frame.device_id) == io.registry.relay_id(IGNITER) {
                    self.igniter_on = true;
                    self.igniter_time = Some(now);
                }
            }
            DeviceKind::Sensor => {}
        }
        None
    }

    /// Lift-off detection: the first positive altitude after the igniter
    /// confirmed means the engine lit.
    pub fn on_feed(&mut self, io: &MissionIo, _update: &FeedUpdate) -> Option<MissionState> {
        if self.igniter_on && !self.ignition_successful && io.registry.sensor(ALTITUDE) > 0.0 {
            self.ignition_successful = true;
            info!("positive altitude, ignition successful, lift-off");
            return Some(MissionState::Flight(super::Flight::default()));
        }
        None
    }

    /// Unlike the other states, ignition retries with the original payload:
    /// the commanded valve position must not be lost mid-window.
    pub fn on_nack(&mut self, io: &MissionIo, frame: &Frame) -> Option<MissionState> {
        io.send_frame(Frame::retry(frame, frame.payload.clone()));
        None
    }
}

#[cfg(test)]
#[path = "ignition_tests.rs"]
mod tests;
