//! A single timed epoch.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One completed epoch: `iterations` back-to-back calls taking `elapsed`.
///
/// Deserialization goes through [`Measurement::new`], so stored records are
/// validated like fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct Measurement {
    elapsed: Duration,
    iterations: u64,
    batch: f64,
}

/// Unvalidated wire form of [`Measurement`].
#[derive(Deserialize)]
struct RawMeasurement {
    elapsed: Duration,
    iterations: u64,
    batch: f64,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = Error;

    fn try_from(raw: RawMeasurement) -> Result<Self> {
        Measurement::new(raw.elapsed, raw.iterations, raw.batch)
    }
}

impl Measurement {
    /// Create a measurement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMeasurement`] if `iterations` is zero or
    /// `batch` is not a positive finite number.
    pub fn new(elapsed: Duration, iterations: u64, batch: f64) -> Result<Self> {
        if iterations == 0 {
            return Err(Error::InvalidMeasurement(
                "iteration count must be at least 1".to_string(),
            ));
        }
        if !(batch.is_finite() && batch > 0.0) {
            return Err(Error::InvalidMeasurement(format!(
                "batch must be positive and finite, got {}",
                batch
            )));
        }
        Ok(Self {
            elapsed,
            iterations,
            batch,
        })
    }

    /// Wall-clock time of the whole epoch.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of calls in the epoch.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Units processed per call.
    pub fn batch(&self) -> f64 {
        self.batch
    }

    /// Seconds per processed unit: `elapsed / (batch * iterations)`.
    pub fn time_per_unit(&self) -> f64 {
        self.elapsed.as_secs_f64() / (self.batch * self.iterations as f64)
    }
}
