//! Benchmark result types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::measurement::Measurement;
use crate::statistics::{median, median_absolute_percentage_error};

/// MdAPE at or above which a result is considered unstable (5%).
pub const UNSTABLE_MDAPE: f64 = 0.05;

/// Stability classification based on the median absolute percentage error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stability {
    /// MdAPE below [`UNSTABLE_MDAPE`].
    Stable,
    /// MdAPE at or above [`UNSTABLE_MDAPE`]; epochs disagree noticeably.
    Unstable,
    /// No measurements, nothing to classify.
    NoData,
}

impl Stability {
    /// Classify a MdAPE value.
    pub fn from_mdape(mdape: f64) -> Self {
        if !mdape.is_finite() {
            return Stability::Unstable;
        }
        if mdape >= UNSTABLE_MDAPE {
            Stability::Unstable
        } else {
            Stability::Stable
        }
    }
}

/// Outcome of one benchmark.
///
/// Built once when calibration finishes and never modified afterwards.
/// Measurements are sorted ascending by time per unit, so [`minimum`],
/// [`median`] and [`maximum`] are projections over that order.
///
/// An empty result signals a failed benchmark: it has no measurements,
/// all summary values are zero, and [`error`] describes what went wrong.
///
/// [`minimum`]: BenchResult::minimum
/// [`median`]: BenchResult::median
/// [`maximum`]: BenchResult::maximum
/// [`error`]: BenchResult::error
///
/// Deserialized results are rebuilt from their measurements: order, median
/// and MdAPE are recomputed rather than trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBenchResult")]
pub struct BenchResult {
    name: String,
    unit: String,
    batch: f64,
    complexity_n: Option<u64>,
    measurements: Vec<Measurement>,
    median: f64,
    median_ape: f64,
    error: Option<String>,
}

/// Wire form of [`BenchResult`]; summary fields are ignored on load.
#[derive(Deserialize)]
struct RawBenchResult {
    name: String,
    unit: String,
    batch: f64,
    #[serde(default)]
    complexity_n: Option<u64>,
    #[serde(default)]
    measurements: Vec<Measurement>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawBenchResult> for BenchResult {
    type Error = Error;

    fn try_from(raw: RawBenchResult) -> Result<Self> {
        if !(raw.batch.is_finite() && raw.batch > 0.0) {
            return Err(Error::InvalidMeasurement(format!(
                "batch must be positive and finite, got {}",
                raw.batch
            )));
        }
        if raw.measurements.is_empty() {
            let error = raw.error.unwrap_or_else(|| "no measurements".to_string());
            let mut empty = Self::empty(raw.name, raw.unit, raw.batch, error);
            empty.complexity_n = raw.complexity_n;
            return Ok(empty);
        }
        Self::from_measurements(raw.name, raw.unit, raw.batch, raw.complexity_n, raw.measurements)
    }
}

impl BenchResult {
    /// Reduce measurements into a result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroElapsed`](crate::Error::ZeroElapsed) if any
    /// measurement has zero time per unit.
    ///
    /// # Panics
    ///
    /// Panics if `measurements` is empty; use [`BenchResult::empty`] for
    /// failed benchmarks.
    pub fn from_measurements(
        name: impl Into<String>,
        unit: impl Into<String>,
        batch: f64,
        complexity_n: Option<u64>,
        mut measurements: Vec<Measurement>,
    ) -> Result<Self> {
        assert!(!measurements.is_empty(), "Cannot build a result without measurements");

        measurements.sort_by(|a, b| a.time_per_unit().total_cmp(&b.time_per_unit()));
        let per_unit: Vec<f64> = measurements.iter().map(Measurement::time_per_unit).collect();
        let median_value = median(&per_unit);
        let median_ape = median_absolute_percentage_error(&per_unit, median_value)?;

        Ok(Self {
            name: name.into(),
            unit: unit.into(),
            batch,
            complexity_n,
            measurements,
            median: median_value,
            median_ape,
            error: None,
        })
    }

    /// Result of a benchmark that produced no usable data.
    pub fn empty(
        name: impl Into<String>,
        unit: impl Into<String>,
        batch: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            batch,
            complexity_n: None,
            measurements: Vec::new(),
            median: 0.0,
            median_ape: 0.0,
            error: Some(error.into()),
        }
    }

    /// Benchmark name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit label, e.g. `"op"` or `"B"`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Units processed per call.
    pub fn batch(&self) -> f64 {
        self.batch
    }

    /// Problem size used for complexity fitting, if tagged.
    pub fn complexity_n(&self) -> Option<u64> {
        self.complexity_n
    }

    /// Recorded measurements, sorted by time per unit.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Whether this is the empty, failed result.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Failure description for empty results.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Median seconds per unit.
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Fastest epoch in seconds per unit.
    pub fn minimum(&self) -> f64 {
        self.measurements.first().map_or(0.0, Measurement::time_per_unit)
    }

    /// Slowest epoch in seconds per unit.
    pub fn maximum(&self) -> f64 {
        self.measurements.last().map_or(0.0, Measurement::time_per_unit)
    }

    /// Median absolute percentage error of the epochs (0.05 = 5%).
    pub fn median_ape(&self) -> f64 {
        self.median_ape
    }

    /// Stability classification of this result.
    pub fn stability(&self) -> Stability {
        if self.is_empty() {
            Stability::NoData
        } else {
            Stability::from_mdape(self.median_ape)
        }
    }

    /// True if the MdAPE reached [`UNSTABLE_MDAPE`].
    pub fn is_unstable(&self) -> bool {
        self.stability() == Stability::Unstable
    }

    /// Throughput in units per second, derived from the median.
    pub fn units_per_second(&self) -> f64 {
        if self.median > 0.0 {
            1.0 / self.median
        } else {
            0.0
        }
    }

    /// Speed relative to `baseline` in percent: `baseline.median / self.median * 100`.
    ///
    /// 200% means twice as fast as the baseline. Returns `None` if either
    /// result is empty.
    pub fn relative_to(&self, baseline: &BenchResult) -> Option<f64> {
        if self.is_empty() || baseline.is_empty() || self.median <= 0.0 {
            return None;
        }
        Some(baseline.median / self.median * 100.0)
    }

    /// Total wall-clock time of all recorded epochs.
    pub fn total_elapsed(&self) -> Duration {
        self.measurements.iter().map(Measurement::elapsed).sum()
    }

    /// Total number of calls over all recorded epochs.
    pub fn total_iterations(&self) -> u64 {
        self.measurements
            .iter()
            .fold(0u64, |acc, m| acc.saturating_add(m.iterations()))
    }
}
