//! Configuration for benchmark runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable naming a benchmark that should run forever.
///
/// Only used for attaching external profilers; see [`Config::endless_from_env`].
pub const ENDLESS_ENV_VAR: &str = "EPOCHBENCH_ENDLESS";

/// Configuration options for [`Bench`](crate::Bench).
///
/// Every field has a default, so partial configurations can be deserialized:
///
/// ```ignore
/// let config: epochbench::Config = serde_json::from_str(r#"{"epochs": 11}"#)?;
/// assert_eq!(config.unit, "op");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Title shown above the result table (default: "benchmark").
    pub title: String,

    /// Unit label for one processed item (default: "op").
    pub unit: String,

    /// Units processed by a single call of the operation (default: 1.0).
    ///
    /// Time per unit is `elapsed / (batch * iterations)`.
    pub batch: f64,

    /// Number of recorded epochs per benchmark (default: 51).
    pub epochs: usize,

    /// Target epoch runtime as a multiple of the clock resolution (default: 1000).
    pub clock_resolution_multiple: u64,

    /// Upper bound on the target epoch runtime (default: 100ms).
    pub max_epoch_time: Duration,

    /// Lower bound on the target epoch runtime (default: 0).
    pub min_epoch_time: Duration,

    /// Iterations of an unrecorded warmup run (default: 0, no warmup).
    pub warmup: u64,

    /// Lower bound for the iteration count of any epoch (default: 1).
    pub min_epoch_iterations: u64,

    /// Fixed iteration count per epoch; 0 lets calibration decide (default: 0).
    pub epoch_iterations: u64,

    /// Show a relative column against the first result (default: false).
    pub relative: bool,

    /// Seed for the calibration jitter generator. `None` uses the fixed default seed.
    pub measurement_seed: Option<u64>,

    /// Name of a benchmark to run in endless mode, if any.
    pub endless: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "benchmark".to_string(),
            unit: "op".to_string(),
            batch: 1.0,
            epochs: 51,
            clock_resolution_multiple: 1_000,
            max_epoch_time: Duration::from_millis(100),
            min_epoch_time: Duration::ZERO,
            warmup: 0,
            min_epoch_iterations: 1,
            epoch_iterations: 0,
            relative: false,
            measurement_seed: None,
            endless: None,
        }
    }
}

impl Config {
    /// Check that the configuration can drive a benchmark.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".to_string()));
        }
        if !(self.batch.is_finite() && self.batch > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "batch must be positive and finite, got {}",
                self.batch
            )));
        }
        if self.clock_resolution_multiple == 0 {
            return Err(Error::InvalidConfig(
                "clock_resolution_multiple must be at least 1".to_string(),
            ));
        }
        if self.min_epoch_iterations == 0 {
            return Err(Error::InvalidConfig(
                "min_epoch_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_epoch_time.is_zero() {
            return Err(Error::InvalidConfig("max_epoch_time must be positive".to_string()));
        }
        if self.min_epoch_time > self.max_epoch_time {
            return Err(Error::InvalidConfig(format!(
                "min_epoch_time ({:?}) exceeds max_epoch_time ({:?})",
                self.min_epoch_time, self.max_epoch_time
            )));
        }
        Ok(())
    }

    /// Read the endless benchmark name from [`ENDLESS_ENV_VAR`].
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn endless_from_env() -> Option<String> {
        match std::env::var(ENDLESS_ENV_VAR) {
            Ok(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Whether the benchmark called `name` should run in endless mode.
    pub fn is_endless(&self, name: &str) -> bool {
        self.endless.as_deref() == Some(name)
    }
}
