// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coasting ascent: watch the altimeter for the first strictly decreasing
//! sample, which marks apogee.

use tracing::info;

use crate::hardware::FeedUpdate;
use crate::frame::DeviceKind;
use crate::mission::MissionIo;

use super::{MissionState, ALTITUDE};

#[derive(Debug, Default)]
pub struct Flight;

impl Flight {
    pub fn on_feed(&mut self, _io: &MissionIo, update: &FeedUpdate) -> Option<MissionState> {
        if update.kind == DeviceKind::Sensor
            && update.name == ALTITUDE
            && update.value < update.prev
        {
            info!(altitude = update.value, peak = update.prev, "apogee detected, landing");
            return Some(MissionState::Landing(super::Landing::default()));
        }
        None
    }
}

#[cfg(test)]
#[path = "flight_tests.rs"]
mod tests;
