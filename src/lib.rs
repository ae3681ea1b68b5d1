//! # epochbench
//!
//! Microbenchmarking with automatic iteration calibration.
//!
//! Each benchmark is measured in *epochs*: runs of the operation repeated
//! enough times to dwarf the clock resolution. The iteration count is found
//! by a small state machine (warmup, upscaling, measuring), after which every
//! epoch is recorded. The median time per unit and its median absolute
//! percentage error (MdAPE) summarize the epochs.
//!
//! ## Keep the optimizer honest
//!
//! An operation whose result is never used may be removed entirely, and the
//! benchmark then measures an empty loop. Pass results through
//! [`do_not_optimize_away`]:
//!
//! ```ignore
//! use epochbench::{Bench, do_not_optimize_away};
//!
//! let mut bench = Bench::new();
//! let mut x = 1u64;
//! bench.run("compare_exchange", || {
//!     x = x.rotate_left(7) ^ 0x9e37_79b9;
//!     do_not_optimize_away(&x);
//! })?;
//! ```
//!
//! If calibration keeps multiplying the iteration count without the elapsed
//! time ever growing, it stops with [`Error::IterationOverflow`].
//!
//! ## Quick Start
//!
//! ```ignore
//! let result = epochbench::run("sum", || (0..100u64).sum::<u64>())?;
//! println!("{:.2} ns/op, err {:.1}%", result.median() * 1e9, result.median_ape() * 100.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod bench;
mod config;
mod error;
mod result;
mod rng;

// Functional modules
pub mod measurement;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use bench::Bench;
pub use config::{Config, ENDLESS_ENV_VAR};
pub use error::{Error, Result};
pub use measurement::{
    black_box, clock_resolution, do_not_optimize_away, do_not_optimize_away_mut,
    IterationLogic, Measurement, State,
};
pub use result::{BenchResult, Stability, UNSTABLE_MDAPE};
pub use rng::{Rng, DEFAULT_SEED};
pub use statistics::BigO;

/// Convenience function: benchmark `op` with the default configuration.
///
/// Equivalent to `Bench::new().run(name, op)` with the result cloned out.
///
/// # Errors
///
/// See [`Bench::run`].
pub fn run<F, T>(name: &str, op: F) -> Result<BenchResult>
where
    F: FnMut() -> T,
{
    Bench::new().run(name, op).cloned()
}
