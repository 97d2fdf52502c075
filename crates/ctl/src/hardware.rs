// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device registry: logical names, bus ids, and last-known values for the
//! servos, relays, and sensors named by the hardware configuration.
//!
//! Registry values are ground truth from hardware — they change only when an
//! inbound FEED frame reports them, never when a command is emitted.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::frame::{DeviceKind, Frame};

/// Relay state value meaning de-energized.
pub const RELAY_DEENERGIZED: f64 = 0.0;

/// Fixed sensor table: name, bus id, seed value.
///
/// Sensors are not declared in the configuration document; their ids follow
/// declaration order here and must match the avionics bridge.
const SENSOR_SEEDS: &[(&str, u8, f64)] = &[
    ("fuel_level", 0, 0.0),
    ("oxidizer_level", 1, 0.0),
    ("altitude", 2, 0.0),
    ("oxidizer_pressure", 3, 0.0),
    ("angle", 4, 2.0),
];

// -- Configuration document ---------------------------------------------------

/// Hardware configuration document (`devices:` section of the YAML file).
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareConfig {
    pub devices: DeviceSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSection {
    pub servo: HashMap<String, ServoSpec>,
    pub relay: HashMap<String, RelaySpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServoSpec {
    pub device_id: u8,
    pub closed_pos: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelaySpec {
    pub device_id: u8,
}

impl HardwareConfig {
    /// Load and parse the configuration file. Fatal on malformed input.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading hardware config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("parsing hardware config {}", path.display()))
    }
}

// -- Registry -----------------------------------------------------------------

/// Last-known servo position plus its declared closed position.
#[derive(Debug, Clone)]
pub struct Servo {
    pub device_id: u8,
    pub position: f64,
    pub closed_pos: f64,
}

/// Last-known relay state (0.0 = de-energized).
#[derive(Debug, Clone)]
pub struct Relay {
    pub device_id: u8,
    pub state: f64,
}

/// Last-known sensor reading.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub device_id: u8,
    pub value: f64,
}

/// A FEED frame applied to the registry: which device changed and how.
///
/// `prev` carries the value the registry held before this frame, which is
/// what the flight state needs to detect apogee.
#[derive(Debug, Clone)]
pub struct FeedUpdate {
    pub kind: DeviceKind,
    pub name: String,
    pub prev: f64,
    pub value: f64,
}

/// Name ↔ id ↔ value mappings for every device on the bus.
pub struct Registry {
    servos: HashMap<String, Servo>,
    relays: HashMap<String, Relay>,
    sensors: HashMap<String, Sensor>,
    servo_names: HashMap<u8, String>,
    relay_names: HashMap<u8, String>,
    sensor_names: HashMap<u8, String>,
}

impl Registry {
    /// Build the registry from a parsed configuration document.
    ///
    /// Servos start at their declared `closed_pos`; relays start
    /// de-energized; sensors take the fixed seed table.
    pub fn from_config(config: &HardwareConfig) -> anyhow::Result<Self> {
        let mut servos = HashMap::new();
        let mut servo_names = HashMap::new();
        for (name, spec) in &config.devices.servo {
            if let Some(other) = servo_names.insert(spec.device_id, name.clone()) {
                anyhow::bail!("servo id {} claimed by both {other} and {name}", spec.device_id);
            }
            servos.insert(
                name.clone(),
                Servo {
                    device_id: spec.device_id,
                    position: spec.closed_pos,
                    closed_pos: spec.closed_pos,
                },
            );
        }

        let mut relays = HashMap::new();
        let mut relay_names = HashMap::new();
        for (name, spec) in &config.devices.relay {
            if let Some(other) = relay_names.insert(spec.device_id, name.clone()) {
                anyhow::bail!("relay id {} claimed by both {other} and {name}", spec.device_id);
            }
            relays.insert(
                name.clone(),
                Relay { device_id: spec.device_id, state: RELAY_DEENERGIZED },
            );
        }

        let mut sensors = HashMap::new();
        let mut sensor_names = HashMap::new();
        for &(name, device_id, value) in SENSOR_SEEDS {
            sensors.insert(name.to_owned(), Sensor { device_id, value });
            sensor_names.insert(device_id, name.to_owned());
        }

        Ok(Self { servos, relays, sensors, servo_names, relay_names, sensor_names })
    }

    pub fn servo_id(&self, name: &str) -> Option<u8> {
        self.servos.get(name).map(|s| s.device_id)
    }

    pub fn relay_id(&self, name: &str) -> Option<u8> {
        self.relays.get(name).map(|r| r.device_id)
    }

    pub fn sensor_id(&self, name: &str) -> Option<u8> {
        self.sensors.get(name).map(|s| s.device_id)
    }

    /// Current reading of a sensor, 0.0 when unknown.
    pub fn sensor(&self, name: &str) -> f64 {
        self.sensors.get(name).map(|s| s.value).unwrap_or_default()
    }

    pub fn servos(&self) -> impl Iterator<Item = (&str, &Servo)> {
        self.servos.iter().map(|(name, servo)| (name.as_str(), servo))
    }

    pub fn relays(&self) -> impl Iterator<Item = (&str, &Relay)> {
        self.relays.iter().map(|(name, relay)| (name.as_str(), relay))
    }

    /// Resolve a (kind, id) address to the device's logical name.
    pub fn name_of(&self, kind: DeviceKind, device_id: u8) -> Option<&str> {
        let names = match kind {
            DeviceKind::Servo => &self.servo_names,
            DeviceKind::Relay => &self.relay_names,
            DeviceKind::Sensor => &self.sensor_names,
        };
        names.get(&device_id).map(String::as_str)
    }

    /// Whether every relay is de-energized and every servo sits at its
    /// declared closed position — the clean pad condition arming requires.
    pub fn all_closed(&self) -> bool {
        self.relays.values().all(|r| r.state == RELAY_DEENERGIZED)
            && self.servos.values().all(|s| s.position == s.closed_pos)
    }

    /// Apply an inbound FEED frame: resolve the addressed device, store
    /// `payload[0]`, and report what changed. Unknown addresses and empty
    /// payloads are dropped with a warning.
    pub fn apply_feed(&mut self, frame: &Frame) -> Option<FeedUpdate> {
        let Some(value) = frame.payload.first().copied() else {
            warn!(%frame, "feed without payload dropped");
            return None;
        };
        let Some(name) = self.name_of(frame.device_kind, frame.device_id).map(str::to_owned)
        else {
            warn!(%frame, "feed for unregistered device dropped");
            return None;
        };

        let prev = match frame.device_kind {
            DeviceKind::Servo => {
                let servo = self.servos.get_mut(&name)?;
                std::mem::replace(&mut servo.position, value)
            }
            DeviceKind::Relay => {
                let relay = self.relays.get_mut(&name)?;
                std::mem::replace(&mut relay.state, value)
            }
            DeviceKind::Sensor => {
                let sensor = self.sensors.get_mut(&name)?;
                std::mem::replace(&mut sensor.value, value)
            }
        };

        Some(FeedUpdate { kind: frame.device_kind, name, prev, value })
    }

    /// Clone the current values for the observability store.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            servos: self.servos.iter().map(|(n, s)| (n.clone(), s.position)).collect(),
            relays: self.relays.iter().map(|(n, r)| (n.clone(), r.state)).collect(),
            sensors: self.sensors.iter().map(|(n, s)| (n.clone(), s.value)).collect(),
        }
    }
}

/// Point-in-time copy of all registry values, cheap to serialize for a UI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrySnapshot {
    pub servos: HashMap<String, f64>,
    pub relays: HashMap<String, f64>,
    pub sensors: HashMap<String, f64>,
}

#[cfg(test)]
#[path = "hardware_tests.rs"]
mod tests;
