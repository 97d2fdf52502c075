// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `missionctl` binary against a loopback TCP listener that
//! plays the avionics bridge.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Resolve the path to the compiled `missionctl` binary.
pub fn missionctl_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("missionctl")
}

/// Resolve the sample hardware configuration at the workspace root.
pub fn flight_yaml() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("flight.yaml")
}

/// A running `missionctl` process, killed on drop.
pub struct MissionProcess {
    child: Child,
}

impl MissionProcess {
    /// Spawn the binary against `endpoint`, optionally auto-arming.
    pub fn start(endpoint: SocketAddr, arm: bool) -> anyhow::Result<Self> {
        let mut command = Command::new(missionctl_binary());
        command
            .arg("--config")
            .arg(flight_yaml())
            .arg("--endpoint")
            .arg(endpoint.to_string())
            .arg("--log-level")
            .arg("debug")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if arm {
            command.arg("--arm");
        }
        Ok(Self { child: command.spawn()? })
    }

    /// Wait up to `timeout` for the process to exit, returning its code.
    pub fn wait_exit(&mut self, timeout: Duration) -> anyhow::Result<Option<i32>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(status.code());
            }
            if Instant::now() > deadline {
                anyhow::bail!("process did not exit within {timeout:?}");
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

impl Drop for MissionProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
