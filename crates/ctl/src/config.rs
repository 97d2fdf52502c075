// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Mission control core for a liquid-propellant sounding rocket.
#[derive(Debug, Parser)]
#[command(name = "missionctl", version, about)]
pub struct Config {
    /// Path to the hardware configuration file.
    #[arg(long, env = "MISSIONCTL_CONFIG")]
    pub config: PathBuf,

    /// TCP endpoint of the avionics bridge or simulator.
    #[arg(long, env = "MISSIONCTL_ENDPOINT", default_value = "127.0.0.1:3000")]
    pub endpoint: String,

    /// Arm the mission after connecting (Idle leaves for Launch once every
    /// device reports closed).
    #[arg(long, env = "MISSIONCTL_ARM")]
    pub arm: bool,

    /// Transport read timeout in milliseconds.
    #[arg(long, env = "MISSIONCTL_TICK_MS", default_value = "100")]
    pub tick_ms: u64,

    /// Log format (json or text).
    #[arg(long, env = "MISSIONCTL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "MISSIONCTL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.endpoint_addr()?;
        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be nonzero");
        }
        Ok(())
    }

    /// Parse the endpoint string into a socket address.
    pub fn endpoint_addr(&self) -> anyhow::Result<SocketAddr> {
        self.endpoint
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid endpoint: {}", self.endpoint))
    }

    /// Transport read timeout.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
