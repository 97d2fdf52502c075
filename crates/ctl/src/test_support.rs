// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a scripted harness around [`Mission`] with
//! channel-backed transport and frame builders for feeds and replies.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::event::MissionEvent;
use crate::frame::{Action, Board, DataType, DeviceKind, Frame, Operation, Priority};
use crate::hardware::{HardwareConfig, Registry};
use crate::mission::{Mission, MissionIo};
use crate::store::Store;

/// The pad configuration every test flies with.
pub const TEST_CONFIG_YAML: &str = "\
devices:
  servo:
    fuel_intake:      {device_id: 0, closed_pos: 100}
    oxidizer_intake:  {device_id: 1, closed_pos: 100}
    fuel_main:        {device_id: 2, closed_pos: 100}
    oxidizer_main:    {device_id: 3, closed_pos: 100}
  relay:
    oxidizer_heater:  {device_id: 0}
    igniter:          {device_id: 1}
    parachute:        {device_id: 2}
";

#[allow(clippy::expect_used)]
pub fn test_config() -> HardwareConfig {
    serde_yaml::from_str(TEST_CONFIG_YAML).expect("test hardware config parses")
}

#[allow(clippy::expect_used)]
pub fn test_registry() -> Registry {
    Registry::from_config(&test_config()).expect("test registry builds")
}

// -- Frame builders -----------------------------------------------------------

fn inbound(
    action: Action,
    kind: DeviceKind,
    device_id: u8,
    operation: Operation,
    payload: Vec<f64>,
) -> Frame {
    Frame {
        source: Board::Software,
        destination: Board::Rocket,
        priority: Priority::High,
        action,
        device_kind: kind,
        device_id,
        data_type: DataType::Float,
        operation,
        payload,
    }
}

/// Telemetry frame for a device addressed by (kind, id).
pub fn feed(kind: DeviceKind, device_id: u8, value: f64) -> Frame {
    inbound(Action::Feed, kind, device_id, Operation::Position, vec![value])
}

/// Positive reply to a servo POSITION command.
pub fn ack_servo_position(device_id: u8, pos: f64) -> Frame {
    inbound(Action::Ack, DeviceKind::Servo, device_id, Operation::Position, vec![pos])
}

/// Positive reply to a relay command.
pub fn ack_relay(device_id: u8, operation: Operation) -> Frame {
    inbound(Action::Ack, DeviceKind::Relay, device_id, operation, Vec::new())
}

/// Negative reply to a command.
pub fn nack(kind: DeviceKind, device_id: u8, operation: Operation, payload: Vec<f64>) -> Frame {
    inbound(Action::Nack, kind, device_id, operation, payload)
}

// -- Harness ------------------------------------------------------------------

/// A [`Mission`] wired to in-memory channels: tests push events in and read
/// emitted frames out, with the event queue pumped by hand so every
/// interleaving is explicit.
pub struct Harness {
    pub mission: Mission,
    pub store: Arc<Store>,
    pub events_tx: mpsc::Sender<MissionEvent>,
    pub events_rx: mpsc::Receiver<MissionEvent>,
    pub outbound_rx: mpsc::Receiver<Frame>,
}

impl Harness {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        let (outbound_tx, outbound_rx) = mpsc::channel(256);
        let store = Arc::new(Store::new());
        let mission =
            Mission::new(test_registry(), outbound_tx, events_tx.clone(), Arc::clone(&store));
        Self { mission, store, events_tx, events_rx, outbound_rx }
    }

    pub fn state(&self) -> &'static str {
        self.mission.state_name()
    }

    /// Dispatch an event immediately, bypassing the queue.
    pub fn dispatch(&mut self, event: MissionEvent) {
        self.mission.dispatch(event);
    }

    pub fn dispatch_frame(&mut self, frame: Frame) {
        self.dispatch(MissionEvent::Frame(frame));
    }

    /// Resolve a sensor name and dispatch a feed for it.
    #[allow(clippy::expect_used)]
    pub fn feed_sensor(&mut self, name: &str, value: f64) {
        let id = self.mission.registry().sensor_id(name).expect("known sensor");
        self.dispatch_frame(feed(DeviceKind::Sensor, id, value));
    }

    /// Let spawned timer tasks run, then dispatch everything they queued.
    /// Call after `tokio::time::advance` in paused-clock tests.
    pub async fn pump(&mut self) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        while let Ok(event) = self.events_rx.try_recv() {
            self.mission.dispatch(event);
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
    }

    /// Advance the paused clock and deliver whatever came due.
    pub async fn advance(&mut self, duration: std::time::Duration) {
        tokio::time::advance(duration).await;
        self.pump().await;
    }

    /// Drain every frame emitted so far.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound_rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

// -- Bare io for state-level tests --------------------------------------------

/// A [`MissionIo`] over fresh channels, for driving a single state directly.
pub fn test_io() -> (MissionIo, mpsc::Receiver<Frame>, mpsc::Receiver<MissionEvent>) {
    let (events_tx, events_rx) = mpsc::channel(256);
    let (outbound_tx, outbound_rx) = mpsc::channel(256);
    let io = MissionIo::new(test_registry(), outbound_tx, events_tx);
    (io, outbound_rx, events_rx)
}

/// Drain every frame currently queued on a receiver.
pub fn drain_frames(rx: &mut mpsc::Receiver<Frame>) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
