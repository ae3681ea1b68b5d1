//! Error types for epochbench.

use thiserror::Error;

/// Errors that can occur while configuring or running a benchmark.
#[derive(Debug, Error)]
pub enum Error {
    /// Scaling the iteration count would leave the `u64` range.
    ///
    /// This almost always means the measured operation was optimized away
    /// and every run reports (close to) zero elapsed time.
    #[error(
        "cannot find a working number of iterations for reliable results \
         (last attempt: {iterations}); maybe your code got optimized away?"
    )]
    IterationOverflow {
        /// Iteration count in effect when scaling failed.
        iterations: u64,
    },

    /// A zero duration reached a division during extrapolation or statistics.
    #[error("elapsed time of zero cannot be used for extrapolation or statistics")]
    ZeroElapsed,

    /// Calibration was asked for a result before recording every epoch.
    #[error("calibration incomplete: recorded {recorded} of {epochs} epochs")]
    Incomplete {
        /// Epochs recorded so far.
        recorded: usize,
        /// Epochs required.
        epochs: usize,
    },

    /// A measurement was constructed with invalid fields.
    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serializing results failed.
    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for epochbench operations.
pub type Result<T> = std::result::Result<T, Error>;
