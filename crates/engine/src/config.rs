// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation configuration

use lockstep_core::ProcessId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one simulation run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of peer processes
    pub processes: u32,
    /// Resource writes per process
    pub writes: u32,
    /// Per-process write overrides, indexed by process id; missing entries
    /// fall back to `writes`
    #[serde(default)]
    pub writes_per_process: Vec<u32>,
    /// How long the exclusive section holds the resource, in milliseconds
    #[serde(with = "duration_ms", default = "default_hold")]
    pub hold: Duration,
    /// Upper bound on the random think time before each request, in
    /// milliseconds; zero makes runs deterministic
    #[serde(with = "duration_ms", default)]
    pub jitter: Duration,
}

fn default_hold() -> Duration {
    Duration::from_millis(20)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            processes: 3,
            writes: 1,
            writes_per_process: Vec::new(),
            hold: default_hold(),
            jitter: Duration::ZERO,
        }
    }
}

impl SimConfig {
    pub fn new(processes: u32, writes: u32) -> Self {
        Self {
            processes,
            writes,
            ..Self::default()
        }
    }

    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_writes_per_process(mut self, writes: impl Into<Vec<u32>>) -> Self {
        self.writes_per_process = writes.into();
        self
    }

    /// Load settings from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processes == 0 {
            return Err(ConfigError::Invalid(
                "at least one process is required".to_string(),
            ));
        }
        if self.writes_per_process.len() > self.processes as usize {
            return Err(ConfigError::Invalid(format!(
                "{} write overrides for {} processes",
                self.writes_per_process.len(),
                self.processes
            )));
        }
        Ok(())
    }

    /// Write budget for one process
    pub fn writes_for(&self, id: ProcessId) -> u32 {
        self.writes_per_process
            .get(id.0 as usize)
            .copied()
            .unwrap_or(self.writes)
    }

    /// The counter value a faultless run must end at
    pub fn expected_total(&self) -> u64 {
        (0..self.processes)
            .map(|id| u64::from(self.writes_for(ProcessId(id))))
            .sum()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
