//! Iteration count calibration.
//!
//! [`IterationLogic`] decides how many times the operation runs in each
//! epoch. Before every epoch the caller asks [`IterationLogic::num_iters`],
//! times that many calls, and reports the elapsed time with
//! [`IterationLogic::add`]. A count of zero means "stop".
//!
//! The protocol moves through these states:
//!
//! - **Warmup**: one unrecorded run with the configured warmup count.
//! - **UpscalingRuntime**: grow the count (x10 while far below target,
//!   otherwise extrapolate) until a run lands close to the target runtime.
//! - **Measuring**: record every run and extrapolate the next count from the
//!   cumulative totals. Fluctuating runs are kept; dropping them would bias
//!   the result towards faster numbers.
//! - **Endless**: keep requesting `u64::MAX` iterations; for profiling only.
//!
//! A run is *close enough* when `elapsed * 3 >= target * 2`, i.e. it took at
//! least two thirds of the target epoch runtime.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::result::BenchResult;
use crate::rng::Rng;

use super::clock::{clock_resolution, saturating_nanos};
use super::record::Measurement;

/// Upper bound of the random upward jitter applied to extrapolated counts (10%).
const JITTER: f64 = 0.1;

/// Calibration protocol state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Unrecorded warmup run.
    Warmup,
    /// Searching for an iteration count that fills the target runtime.
    UpscalingRuntime,
    /// Recording every epoch.
    Measuring,
    /// Never terminates; requests the maximum iteration count.
    Endless,
}

/// Iteration calibration state machine for one benchmark run.
#[derive(Debug)]
pub struct IterationLogic {
    name: String,
    unit: String,
    batch: f64,
    complexity_n: Option<u64>,
    epochs: usize,
    min_epoch_iterations: u64,
    epoch_iterations: u64,
    target_runtime: Duration,
    state: State,
    num_iters: u64,
    total_elapsed: Duration,
    total_iters: u64,
    measurements: Vec<Measurement>,
    rng: Rng,
    failure: Option<Error>,
}

impl IterationLogic {
    /// Create the state machine using the process-wide clock resolution.
    ///
    /// `endless` selects the endless profiling mode; it is an explicit flag
    /// so the state machine never looks at the environment itself.
    pub fn new(name: &str, config: &Config, endless: bool) -> Result<Self> {
        Self::with_clock_resolution(name, config, clock_resolution(), endless)
    }

    /// Create the state machine with a known clock resolution.
    ///
    /// The target epoch runtime is `resolution * clock_resolution_multiple`,
    /// clamped into `[min_epoch_time, max_epoch_time]`.
    pub fn with_clock_resolution(
        name: &str,
        config: &Config,
        resolution: Duration,
        endless: bool,
    ) -> Result<Self> {
        config.validate()?;

        let target_nanos = resolution
            .as_nanos()
            .saturating_mul(u128::from(config.clock_resolution_multiple));
        let target_runtime = Duration::from_nanos(u64::try_from(target_nanos).unwrap_or(u64::MAX))
            .clamp(config.min_epoch_time, config.max_epoch_time);

        let (state, num_iters) = if endless {
            (State::Endless, u64::MAX)
        } else if config.warmup > 0 {
            (State::Warmup, config.warmup)
        } else if config.epoch_iterations > 0 {
            (State::Measuring, config.epoch_iterations)
        } else {
            (State::UpscalingRuntime, config.min_epoch_iterations)
        };

        let rng = match config.measurement_seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };

        debug!(
            benchmark = name,
            ?state,
            num_iters,
            target_runtime_ns = saturating_nanos(target_runtime),
            "starting calibration"
        );

        Ok(Self {
            name: name.to_string(),
            unit: config.unit.clone(),
            batch: config.batch,
            complexity_n: None,
            epochs: config.epochs,
            min_epoch_iterations: config.min_epoch_iterations,
            epoch_iterations: config.epoch_iterations,
            target_runtime,
            state,
            num_iters,
            total_elapsed: Duration::ZERO,
            total_iters: 0,
            measurements: Vec::with_capacity(config.epochs),
            rng,
            failure: None,
        })
    }

    /// Tag the eventual result with a problem size for complexity fitting.
    pub fn with_complexity_n(mut self, n: Option<u64>) -> Self {
        self.complexity_n = n;
        self
    }

    /// Iterations to run in the next epoch; 0 when finished or failed.
    #[inline]
    pub fn num_iters(&self) -> u64 {
        self.num_iters
    }

    /// Current protocol state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Target runtime of one epoch.
    pub fn target_runtime(&self) -> Duration {
        self.target_runtime
    }

    /// Measurements recorded so far, in recording order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Whether the run stopped because of an error.
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// Report the elapsed time of the epoch that just ran `num_iters()` calls.
    ///
    /// Calls after the run finished or failed are ignored.
    pub fn add(&mut self, elapsed: Duration) {
        if self.num_iters == 0 {
            return;
        }

        if let Err(err) = self.step(elapsed) {
            warn!(benchmark = %self.name, iterations = self.num_iters, %err, "calibration failed");
            self.failure = Some(err);
            self.num_iters = 0;
            return;
        }

        if self.state != State::Endless && self.measurements.len() == self.epochs {
            debug!(
                benchmark = %self.name,
                epochs = self.epochs,
                total_iters = self.total_iters,
                "all epochs recorded"
            );
            self.num_iters = 0;
        }
    }

    /// Build the result once all epochs are recorded.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped calibration, or [`Error::Incomplete`]
    /// if called before every epoch was recorded.
    pub fn finish(self) -> Result<BenchResult> {
        if let Some(err) = self.failure {
            return Err(err);
        }
        if self.measurements.len() != self.epochs {
            return Err(Error::Incomplete {
                recorded: self.measurements.len(),
                epochs: self.epochs,
            });
        }
        BenchResult::from_measurements(
            self.name,
            self.unit,
            self.batch,
            self.complexity_n,
            self.measurements,
        )
    }

    fn step(&mut self, elapsed: Duration) -> Result<()> {
        match self.state {
            State::Warmup => {
                if self.is_close_enough(elapsed) {
                    // Good enough to skip upscaling, but warmup is never recorded.
                    self.transition(State::Measuring);
                    self.num_iters = self.calc_best_num_iters(elapsed, self.num_iters)?;
                } else {
                    self.transition(State::UpscalingRuntime);
                    self.upscale(elapsed)?;
                }
            }
            State::UpscalingRuntime => {
                if self.is_close_enough(elapsed) {
                    self.record(elapsed)?;
                    self.transition(State::Measuring);
                    self.num_iters = self.calc_best_num_iters(self.total_elapsed, self.total_iters)?;
                } else {
                    self.upscale(elapsed)?;
                }
            }
            State::Measuring => {
                self.record(elapsed)?;
                self.num_iters = if self.epoch_iterations > 0 {
                    self.epoch_iterations
                } else {
                    self.calc_best_num_iters(self.total_elapsed, self.total_iters)?
                };
            }
            State::Endless => {
                self.num_iters = u64::MAX;
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: State) {
        debug!(benchmark = %self.name, from = ?self.state, to = ?next, "calibration state change");
        self.state = next;
    }

    fn record(&mut self, elapsed: Duration) -> Result<()> {
        let measurement = Measurement::new(elapsed, self.num_iters, self.batch)?;
        self.total_elapsed = self.total_elapsed.saturating_add(elapsed);
        self.total_iters = self.total_iters.saturating_add(self.num_iters);
        self.measurements.push(measurement);
        Ok(())
    }

    fn is_close_enough(&self, elapsed: Duration) -> bool {
        elapsed.as_nanos() * 3 >= self.target_runtime.as_nanos() * 2
    }

    /// Grow the iteration count after a run that was not close enough.
    fn upscale(&mut self, elapsed: Duration) -> Result<()> {
        if elapsed.as_nanos() * 10 < self.target_runtime.as_nanos() {
            self.num_iters = self
                .num_iters
                .checked_mul(10)
                .ok_or(Error::IterationOverflow {
                    iterations: self.num_iters,
                })?;
        } else {
            self.num_iters = self.calc_best_num_iters(elapsed, self.num_iters)?;
        }
        Ok(())
    }

    /// Extrapolate the count that fills the target runtime, with jitter.
    ///
    /// The 0-10% upward jitter keeps successive epochs from locking onto the
    /// same slightly wrong count.
    fn calc_best_num_iters(&mut self, elapsed: Duration, iters: u64) -> Result<u64> {
        if elapsed.is_zero() {
            return Err(Error::ZeroElapsed);
        }

        let target = self.target_runtime.as_nanos() as f64;
        let mut new_iters = target / elapsed.as_nanos() as f64 * iters as f64;
        new_iters = new_iters.max(self.min_epoch_iterations as f64);
        new_iters *= 1.0 + JITTER * self.rng.uniform01();

        let rounded = new_iters + 0.5;
        // Also rejects NaN and infinity.
        if !(rounded < u64::MAX as f64) {
            return Err(Error::IterationOverflow { iterations: iters });
        }
        Ok(rounded as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESOLUTION: Duration = Duration::from_nanos(100);

    fn config() -> Config {
        Config {
            epochs: 5,
            ..Config::default()
        }
    }

    fn logic(config: &Config) -> IterationLogic {
        IterationLogic::with_clock_resolution("test", config, RESOLUTION, false).unwrap()
    }

    #[test]
    fn test_target_runtime_clamped() {
        let l = logic(&config());
        assert_eq!(l.target_runtime(), Duration::from_micros(100));

        let capped = Config {
            max_epoch_time: Duration::from_micros(10),
            ..config()
        };
        assert_eq!(logic(&capped).target_runtime(), Duration::from_micros(10));

        let floored = Config {
            min_epoch_time: Duration::from_millis(1),
            ..config()
        };
        assert_eq!(logic(&floored).target_runtime(), Duration::from_millis(1));
    }

    #[test]
    fn test_initial_states() {
        let l = logic(&config());
        assert_eq!(l.state(), State::UpscalingRuntime);
        assert_eq!(l.num_iters(), 1);

        let warm = logic(&Config {
            warmup: 500,
            ..config()
        });
        assert_eq!(warm.state(), State::Warmup);
        assert_eq!(warm.num_iters(), 500);

        let fixed = logic(&Config {
            epoch_iterations: 77,
            ..config()
        });
        assert_eq!(fixed.state(), State::Measuring);
        assert_eq!(fixed.num_iters(), 77);

        let endless = IterationLogic::with_clock_resolution("e", &config(), RESOLUTION, true).unwrap();
        assert_eq!(endless.state(), State::Endless);
        assert_eq!(endless.num_iters(), u64::MAX);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = Config {
            epochs: 0,
            ..config()
        };
        assert!(matches!(
            IterationLogic::with_clock_resolution("bad", &bad, RESOLUTION, false),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_upscales_by_ten_when_far_below_target() {
        let mut l = logic(&config());
        l.add(Duration::from_nanos(10));
        assert_eq!(l.num_iters(), 10);
        assert_eq!(l.state(), State::UpscalingRuntime);
        assert!(l.measurements().is_empty());
    }

    #[test]
    fn test_extrapolates_with_jitter() {
        let mut l = logic(&config());
        // 1 iteration took 20us of a 100us target: not close, not below 10%.
        l.add(Duration::from_micros(20));
        let n = l.num_iters();
        assert!((5..=6).contains(&n), "n = {}", n);
        assert_eq!(l.state(), State::UpscalingRuntime);
    }

    #[test]
    fn test_close_enough_threshold() {
        let l = logic(&config());
        // target 100us: two thirds is 66.666us
        assert!(!l.is_close_enough(Duration::from_nanos(66_666)));
        assert!(l.is_close_enough(Duration::from_nanos(66_667)));
    }

    #[test]
    fn test_upscaling_records_on_close_enough() {
        let mut l = logic(&config());
        l.add(Duration::from_micros(90));
        assert_eq!(l.state(), State::Measuring);
        assert_eq!(l.measurements().len(), 1);
    }

    #[test]
    fn test_warmup_never_recorded() {
        let mut l = logic(&Config {
            warmup: 10,
            ..config()
        });
        l.add(Duration::from_micros(95));
        assert_eq!(l.state(), State::Measuring);
        assert!(l.measurements().is_empty());

        let mut slow_start = logic(&Config {
            warmup: 10,
            ..config()
        });
        slow_start.add(Duration::from_nanos(50));
        assert_eq!(slow_start.state(), State::UpscalingRuntime);
        assert_eq!(slow_start.num_iters(), 100);
        assert!(slow_start.measurements().is_empty());
    }

    #[test]
    fn test_measuring_records_everything_and_terminates() {
        let mut l = logic(&config());
        l.add(Duration::from_micros(100));
        // A run far below target is still recorded once measuring.
        l.add(Duration::from_micros(1));
        assert_eq!(l.measurements().len(), 2);
        while l.num_iters() != 0 {
            l.add(Duration::from_micros(100));
        }
        assert_eq!(l.measurements().len(), 5);
        let result = l.finish().unwrap();
        assert_eq!(result.measurements().len(), 5);
    }

    #[test]
    fn test_fixed_epoch_iterations() {
        let mut l = logic(&Config {
            epoch_iterations: 3,
            ..config()
        });
        while l.num_iters() != 0 {
            assert_eq!(l.num_iters(), 3);
            l.add(Duration::from_micros(5));
        }
        assert!(l.measurements().iter().all(|m| m.iterations() == 3));
    }

    #[test]
    fn test_zero_elapsed_overflows() {
        let mut l = logic(&config());
        let mut runs = 0;
        while l.num_iters() != 0 {
            l.add(Duration::ZERO);
            runs += 1;
            assert!(runs < 100, "calibration did not terminate");
        }
        assert!(matches!(l.failure(), Some(Error::IterationOverflow { .. })));
        assert!(matches!(l.finish(), Err(Error::IterationOverflow { .. })));
    }

    #[test]
    fn test_extrapolation_overflow() {
        let mut l = logic(&Config {
            min_epoch_iterations: u64::MAX / 2,
            ..config()
        });
        // Not far below target, so extrapolation runs and exceeds u64.
        l.add(Duration::from_micros(20));
        assert!(matches!(l.failure(), Some(Error::IterationOverflow { .. })));
        assert_eq!(l.num_iters(), 0);
    }

    #[test]
    fn test_zero_elapsed_in_measuring_rejected_by_statistics() {
        let mut l = logic(&Config {
            epoch_iterations: 1,
            epochs: 2,
            ..config()
        });
        l.add(Duration::ZERO);
        l.add(Duration::from_micros(1));
        assert_eq!(l.num_iters(), 0);
        assert!(matches!(l.finish(), Err(Error::ZeroElapsed)));
    }

    #[test]
    fn test_endless_never_finishes() {
        let mut l = IterationLogic::with_clock_resolution("e", &config(), RESOLUTION, true).unwrap();
        for _ in 0..1_000 {
            l.add(Duration::from_micros(100));
            assert_eq!(l.num_iters(), u64::MAX);
        }
        assert!(l.measurements().is_empty());
    }

    #[test]
    fn test_finish_before_done_is_incomplete() {
        let l = logic(&config());
        assert!(matches!(
            l.finish(),
            Err(Error::Incomplete {
                recorded: 0,
                epochs: 5
            })
        ));
    }

    #[test]
    fn test_add_after_finish_ignored() {
        let mut l = logic(&Config {
            epoch_iterations: 1,
            epochs: 1,
            ..config()
        });
        l.add(Duration::from_micros(1));
        assert_eq!(l.num_iters(), 0);
        l.add(Duration::from_micros(1));
        assert_eq!(l.measurements().len(), 1);
    }
}
