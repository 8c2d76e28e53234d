//! Simulation configuration, loadable from a TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest request rate the work generator can pace.
pub const MAX_RPS: u32 = 999;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one simulation run.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Mean render latency in milliseconds.
    pub mean_latency_ms: f64,
    /// Standard deviation of render latency in milliseconds.
    pub std_dev_latency_ms: f64,
    /// Initial number of workers.
    pub worker_count: usize,
    /// Slots per worker, including workers added by the autoscaler.
    pub worker_slots: usize,
    /// Error rate the autoscaler steers towards (0.001 is three nines).
    pub target_error_rate: f64,
    /// Scale-up cooldown in seconds; scale-down waits twice as long.
    pub autoscale_delay_secs: u64,
    /// Renders generated per second.
    pub rps: u32,
    /// The autoscaler never shrinks the pool below this many workers.
    pub min_workers: usize,
    /// Fixed seed for reproducible runs. Entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mean_latency_ms: 1000.0,
            std_dev_latency_ms: 1000.0,
            worker_count: 12,
            worker_slots: 15,
            target_error_rate: 0.001,
            autoscale_delay_secs: 5,
            rps: 50,
            min_workers: 1,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mean_latency_ms.is_finite() {
            return Err(invalid("mean_latency_ms must be finite"));
        }
        if !self.std_dev_latency_ms.is_finite() || self.std_dev_latency_ms < 0.0 {
            return Err(invalid("std_dev_latency_ms must be a non-negative number"));
        }
        if self.worker_count == 0 {
            return Err(invalid("worker_count must be at least 1"));
        }
        if self.worker_slots == 0 {
            return Err(invalid("worker_slots must be at least 1"));
        }
        if !self.target_error_rate.is_finite() || self.target_error_rate < 0.0 {
            return Err(invalid("target_error_rate must be a non-negative number"));
        }
        if self.autoscale_delay_secs == 0 {
            return Err(invalid("autoscale_delay_secs must be at least 1"));
        }
        if self.rps == 0 || self.rps > MAX_RPS {
            return Err(invalid(format!("rps must be between 1 and {MAX_RPS}")));
        }
        if self.min_workers == 0 {
            return Err(invalid("min_workers must be at least 1"));
        }
        Ok(())
    }

    pub fn autoscale_delay(&self) -> Duration {
        Duration::from_secs(self.autoscale_delay_secs)
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}
