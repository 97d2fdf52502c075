// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame data model: the addressed, typed message unit exchanged with the
//! hardware abstraction layer, plus constructors for the command shapes the
//! mission emits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Servo position commanded when a valve should be fully open.
pub const SERVO_OPEN: f64 = 0.0;
/// Servo position commanded when a valve should be fully closed.
pub const SERVO_CLOSED: f64 = 100.0;

/// Board identifiers used for frame addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    Rocket,
    Software,
}

/// Frame priority on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    High,
}

/// What a frame carries: telemetry, a command, or a reply to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Feed,
    Service,
    Ack,
    Nack,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Service => "service",
            Self::Ack => "ack",
            Self::Nack => "nack",
        }
    }
}

/// Hardware device classes addressable on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Servo,
    Relay,
    Sensor,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Servo => "servo",
            Self::Relay => "relay",
            Self::Sensor => "sensor",
        }
    }
}

/// Payload type tag. Only float payloads exist on this bus today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Float,
}

/// Kind-specific operation code.
///
/// Servos accept `Position` (payload `(pos,)`, 0 = open, 100 = closed) and
/// the payload-less `Close` convenience; relays accept `Open` (energize) and
/// `Close` (de-energize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Open,
    Close,
    Position,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Position => "position",
        }
    }
}

/// An addressed message exchanged with the avionics bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub source: Board,
    pub destination: Board,
    pub priority: Priority,
    pub action: Action,
    pub device_kind: DeviceKind,
    pub device_id: u8,
    pub data_type: DataType,
    pub operation: Operation,
    #[serde(default)]
    pub payload: Vec<f64>,
}

impl Frame {
    fn service(
        priority: Priority,
        device_kind: DeviceKind,
        device_id: u8,
        operation: Operation,
        payload: Vec<f64>,
    ) -> Self {
        Self {
            source: Board::Rocket,
            destination: Board::Software,
            priority,
            action: Action::Service,
            device_kind,
            device_id,
            data_type: DataType::Float,
            operation,
            payload,
        }
    }

    /// Command a servo to the given position (0 = open, 100 = closed).
    pub fn servo_position(device_id: u8, pos: f64) -> Self {
        Self::service(Priority::High, DeviceKind::Servo, device_id, Operation::Position, vec![pos])
    }

    /// Convenience close for a servo, equivalent to commanding `closed_pos`.
    /// Sent at low priority: this is housekeeping, not an actuation step.
    pub fn servo_close(device_id: u8) -> Self {
        Self::service(Priority::Low, DeviceKind::Servo, device_id, Operation::Close, Vec::new())
    }

    /// Energize a relay.
    pub fn relay_open(device_id: u8) -> Self {
        Self::service(Priority::High, DeviceKind::Relay, device_id, Operation::Open, Vec::new())
    }

    /// De-energize a relay as an actuation step (high priority).
    pub fn relay_close(device_id: u8) -> Self {
        Self::service(Priority::High, DeviceKind::Relay, device_id, Operation::Close, Vec::new())
    }

    /// Low-priority relay de-energize used when tidying up from Idle.
    pub fn relay_release(device_id: u8) -> Self {
        Self::service(Priority::Low, DeviceKind::Relay, device_id, Operation::Close, Vec::new())
    }

    /// Build the retry for a NACKed command: same device and operation,
    /// source and destination swapped, high priority.
    ///
    /// Most states retry with an empty payload; ignition passes the NACK's
    /// payload through so the commanded valve position is not lost.
    pub fn retry(nack: &Frame, payload: Vec<f64>) -> Self {
        Self {
            source: nack.destination,
            destination: nack.source,
            priority: Priority::High,
            action: Action::Service,
            device_kind: nack.device_kind,
            device_id: nack.device_id,
            data_type: nack.data_type,
            operation: nack.operation,
            payload,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}#{} {}{:?}",
            self.action.as_str(),
            self.device_kind.as_str(),
            self.device_id,
            self.operation.as_str(),
            self.payload,
        )
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
