// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use super::*;
use crate::frame::{Action, Priority};
use crate::test_support::{ack_servo_position, drain_frames, feed, nack, test_io};

fn feed_sensor(io: &mut MissionIo, name: &str, value: f64) -> FeedUpdate {
    let id = io.registry.sensor_id(name).unwrap_or(u8::MAX);
    io.registry
        .apply_feed(&feed(DeviceKind::Sensor, id, value))
        .unwrap_or_else(|| panic!("feed for {name} should apply"))
}

#[test]
fn entry_opens_the_oxidizer_intake() {
    let (io, mut outbound, _events) = test_io();
    let mut launch = Launch::default();
    assert!(launch.enter(&io).is_none());

    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].device_kind, DeviceKind::Servo);
    assert_eq!(frames[0].device_id, 1);
    assert_eq!(frames[0].operation, Operation::Position);
    assert_eq!(frames[0].payload, vec![SERVO_OPEN]);
    assert_eq!(frames[0].priority, Priority::High);
}

#[test]
fn full_tank_closes_the_intake() {
    let (mut io, mut outbound, _events) = test_io();
    let mut launch = Launch::default();
    launch.enter(&io);
    drain_frames(&mut outbound);

    let update = feed_sensor(&mut io, OXIDIZER_LEVEL, 100.0);
    assert!(launch.on_feed(&io, &update).is_none());

    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].device_id, 1);
    assert_eq!(frames[0].payload, vec![SERVO_CLOSED]);
}

#[test]
fn partial_tank_does_nothing() {
    let (mut io, mut outbound, _events) = test_io();
    let mut launch = Launch::default();
    launch.enter(&io);
    drain_frames(&mut outbound);

    let update = feed_sensor(&mut io, OXIDIZER_LEVEL, 60.0);
    assert!(launch.on_feed(&io, &update).is_none());
    assert!(drain_frames(&mut outbound).is_empty());
}

#[test]
fn pressure_in_band_without_closed_intake_does_not_advance() {
    let (mut io, _outbound, _events) = test_io();
    let mut launch = Launch::default();
    launch.enter(&io);

    let update = feed_sensor(&mut io, OXIDIZER_PRESSURE, 30.0);
    assert!(launch.on_feed(&io, &update).is_none());
}

#[parameterized(
    nominal = { 31.0, true },
    upper_edge_inside = { 34.9, true },
    lower_edge_inside = { 26.0, true },
    upper_edge_outside = { 35.0, false },
    lower_edge_outside = { 25.0, false },
)]
fn pressure_band_gates_the_handover(pressure: f64, advances: bool) {
    let (mut io, _outbound, _events) = test_io();
    let mut launch = Launch::default();
    launch.enter(&io);

    // intake confirmed closed → loading is complete
    launch.on_ack(&io, &ack_servo_position(1, SERVO_CLOSED));

    let update = feed_sensor(&mut io, OXIDIZER_PRESSURE, pressure);
    let next = launch.on_feed(&io, &update);
    assert_eq!(matches!(next, Some(MissionState::Fuel(_))), advances, "pressure {pressure}");
}

#[test]
fn ack_for_a_different_servo_does_not_complete_loading() {
    let (mut io, _outbound, _events) = test_io();
    let mut launch = Launch::default();
    launch.enter(&io);

    launch.on_ack(&io, &ack_servo_position(2, SERVO_CLOSED));
    let update = feed_sensor(&mut io, OXIDIZER_PRESSURE, 30.0);
    assert!(launch.on_feed(&io, &update).is_none());
}

#[test]
fn nack_retries_with_swapped_addressing_and_empty_payload() {
    let (io, mut outbound, _events) = test_io();
    let mut launch = Launch::default();

    let nack = nack(DeviceKind::Servo, 1, Operation::Position, vec![0.0]);
    assert!(launch.on_nack(&io, &nack).is_none());

    let frames = drain_frames(&mut outbound);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].source, nack.destination);
    assert_eq!(frames[0].destination, nack.source);
    assert_eq!(frames[0].action, Action::Service);
    assert_eq!(frames[0].device_id, 1);
    assert_eq!(frames[0].operation, Operation::Position);
    assert!(frames[0].payload.is_empty());
}
