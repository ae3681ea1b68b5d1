//! Measurement infrastructure.
//!
//! This module provides:
//! - A monotonic clock with an empirically measured, cached resolution
//! - Optimization barriers that keep measured code from being elided
//! - The [`Measurement`] record of a single epoch
//! - The [`IterationLogic`] state machine that calibrates iteration counts
//!
//! # Clock
//!
//! Timing uses `std::time::Instant`. Its resolution is discovered at first
//! use by spinning until the clock ticks, 20 times, and keeping the smallest
//! gap. Typical values are 20-40ns on Linux and macOS.

mod barrier;
pub mod clock;
mod iteration;
mod record;

pub use barrier::{black_box, do_not_optimize_away, do_not_optimize_away_mut};
pub use clock::{calc_clock_resolution, clock_resolution};
pub use iteration::{IterationLogic, State};
pub use record::Measurement;
