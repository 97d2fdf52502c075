// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{ack_relay, drain_frames, feed, nack, test_io};

fn feed_pressure(io: &mut MissionIo, value: f64) -> FeedUpdate {
    let id = io.registry.sensor_id(OXIDIZER_PRESSURE).unwrap_or(u8::MAX);
    io.registry
        .apply_feed(&feed(DeviceKind::Sensor, id, value))
        .unwrap_or_else(|| panic!("pressure feed should apply"))
}

#[test]
fn entry_turns_the_heater_on() {
    let (io, mut outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();
    assert!(heating.enter(&io).is_none());

    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].device_kind, DeviceKind::Relay);
    assert_eq!(frames[0].device_id, 0);
    assert_eq!(frames[0].operation, Operation::Open);
}

#[test]
fn pressure_before_heater_confirmation_is_ignored() {
    let (mut io, mut outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();
    heating.enter(&io);
    drain_frames(&mut outbound);

    let update = feed_pressure(&mut io, 70.0);
    assert!(heating.on_feed(&io, &update).is_none());
    assert!(drain_frames(&mut outbound).is_empty());
}

#[test]
fn target_pressure_turns_the_heater_off() {
    let (mut io, mut outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();
    heating.enter(&io);
    heating.on_ack(&io, &ack_relay(0, Operation::Open));
    drain_frames(&mut outbound);

    let update = feed_pressure(&mut io, 64.9);
    assert!(heating.on_feed(&io, &update).is_none());
    assert!(drain_frames(&mut outbound).is_empty());

    let update = feed_pressure(&mut io, 65.0);
    assert!(heating.on_feed(&io, &update).is_none());
    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].device_id, 0);
    assert_eq!(frames[0].operation, Operation::Close);
}

#[test]
fn heater_off_confirmation_hands_over_to_ignition() {
    let (io, _outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();
    heating.enter(&io);
    heating.on_ack(&io, &ack_relay(0, Operation::Open));

    let next = heating.on_ack(&io, &ack_relay(0, Operation::Close));
    assert!(matches!(next, Some(MissionState::Ignition(_))));
}

#[test]
fn acks_for_other_relays_are_ignored() {
    let (io, _outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();
    heating.enter(&io);

    assert!(heating.on_ack(&io, &ack_relay(1, Operation::Close)).is_none());
    assert!(heating.on_ack(&io, &ack_relay(2, Operation::Open)).is_none());
}

#[test]
fn nack_retries_with_empty_payload() {
    let (io, mut outbound, _events) = test_io();
    let mut heating = HeatingOxidizer::default();

    let nack = nack(DeviceKind::Relay, 0, Operation::Open, Vec::new());
    heating.on_nack(&io, &nack);

    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].source, nack.destination);
    assert_eq!(frames[0].destination, nack.source);
    assert_eq!(frames[0].operation, Operation::Open);
}
