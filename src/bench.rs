//! Main `Bench` entry point and builder.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::measurement::{black_box, clock, IterationLogic};
use crate::output;
use crate::result::BenchResult;
use crate::statistics::{big_o, BigO};

/// Benchmark runner.
///
/// Holds the configuration shared by a group of benchmarks and the results
/// of every benchmark run so far.
///
/// # Example
///
/// ```ignore
/// use epochbench::{Bench, do_not_optimize_away};
///
/// let mut bench = Bench::new().title("hashing").unit("B").batch(4096.0);
/// let data = vec![0u8; 4096];
/// bench.run("fxhash", || do_not_optimize_away(&fxhash(&data)))?;
/// bench.run("siphash", || do_not_optimize_away(&siphash(&data)))?;
/// println!("{}", bench.render_table());
/// ```
///
/// # Endless mode
///
/// When the `EPOCHBENCH_ENDLESS` environment variable equals a benchmark's
/// name, [`Bench::new`] configures that benchmark to run forever so a
/// profiler can be attached. [`Bench::from_config`] never reads the
/// environment.
#[derive(Debug, Clone)]
pub struct Bench {
    config: Config,
    baseline: Option<BenchResult>,
    complexity_n: Option<u64>,
    results: Vec<BenchResult>,
}

impl Default for Bench {
    fn default() -> Self {
        Self::new()
    }
}

impl Bench {
    /// Create with default configuration.
    ///
    /// Reads the endless benchmark name from the environment.
    pub fn new() -> Self {
        Self::from_config(Config {
            endless: Config::endless_from_env(),
            ..Config::default()
        })
    }

    /// Create from an explicit configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            baseline: None,
            complexity_n: None,
            results: Vec::new(),
        }
    }

    /// Set the table title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Set the unit label.
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.config.unit = unit.into();
        self
    }

    /// Set units processed per call.
    pub fn batch(mut self, batch: f64) -> Self {
        self.config.batch = batch;
        self
    }

    /// Set the number of recorded epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.config.epochs = epochs;
        self
    }

    /// Set the target epoch runtime as a multiple of the clock resolution.
    pub fn clock_resolution_multiple(mut self, multiple: u64) -> Self {
        self.config.clock_resolution_multiple = multiple;
        self
    }

    /// Set the upper bound of the target epoch runtime.
    pub fn max_epoch_time(mut self, max: std::time::Duration) -> Self {
        self.config.max_epoch_time = max;
        self
    }

    /// Set the lower bound of the target epoch runtime.
    pub fn min_epoch_time(mut self, min: std::time::Duration) -> Self {
        self.config.min_epoch_time = min;
        self
    }

    /// Set warmup iterations (0 disables warmup).
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.config.warmup = iterations;
        self
    }

    /// Set the minimum iterations per epoch.
    pub fn min_epoch_iterations(mut self, iterations: u64) -> Self {
        self.config.min_epoch_iterations = iterations;
        self
    }

    /// Use a fixed iteration count per epoch (0 restores calibration).
    pub fn epoch_iterations(mut self, iterations: u64) -> Self {
        self.config.epoch_iterations = iterations;
        self
    }

    /// Compare every result to the first one.
    pub fn relative(mut self, enabled: bool) -> Self {
        self.config.relative = enabled;
        self
    }

    /// Set the seed of the calibration jitter generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.measurement_seed = Some(seed);
        self
    }

    /// Name of a benchmark to run endlessly, or `None`.
    pub fn endless(mut self, name: Option<String>) -> Self {
        self.config.endless = name;
        self
    }

    /// Use `baseline` as the reference for relative speed.
    ///
    /// The result is only read; it can come from another `Bench`.
    pub fn baseline(&mut self, baseline: BenchResult) -> &mut Self {
        self.baseline = Some(baseline);
        self
    }

    /// Tag subsequent results with problem size `n` for complexity fitting.
    pub fn complexity_n(&mut self, n: u64) -> &mut Self {
        self.complexity_n = Some(n);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Results of all benchmarks run so far, including failed ones.
    pub fn results(&self) -> &[BenchResult] {
        &self.results
    }

    /// Reference result for relative comparison, if any.
    pub fn baseline_result(&self) -> Option<&BenchResult> {
        self.baseline.as_ref()
    }

    /// Relative speed of `result` against the baseline in percent.
    pub fn relative_of(&self, result: &BenchResult) -> Option<f64> {
        self.baseline.as_ref().and_then(|b| result.relative_to(b))
    }

    /// Run `op` repeatedly and record a result named `name`.
    ///
    /// The timed region contains nothing but the loop calling `op`; keep
    /// setup outside the closure. Panics in `op` propagate.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid configuration, or when calibration fails
    /// (e.g. [`Error::IterationOverflow`](crate::Error::IterationOverflow)
    /// if `op` was optimized away). In the latter case an empty result
    /// carrying the message is still appended to [`Bench::results`].
    pub fn run<F, T>(&mut self, name: &str, mut op: F) -> Result<&BenchResult>
    where
        F: FnMut() -> T,
    {
        let endless = self.config.is_endless(name);
        if endless {
            warn!(benchmark = name, "running in endless mode, this never returns");
        }
        let mut logic =
            IterationLogic::new(name, &self.config, endless)?.with_complexity_n(self.complexity_n);

        loop {
            let n = logic.num_iters();
            if n == 0 {
                break;
            }

            let before = clock::now();
            for _ in 0..n {
                black_box(op());
            }
            let after = clock::now();

            logic.add(after.duration_since(before));
        }

        self.complete(name, logic)
    }

    /// Turn a finished calibration into a stored result.
    ///
    /// A failed calibration still appends an empty result carrying the
    /// error message; the error is returned afterwards.
    fn complete(&mut self, name: &str, logic: IterationLogic) -> Result<&BenchResult> {
        let (result, failure) = match logic.finish() {
            Ok(result) => (result, None),
            Err(err) => {
                let empty = BenchResult::empty(
                    name,
                    self.config.unit.clone(),
                    self.config.batch,
                    err.to_string(),
                );
                (empty, Some(err))
            }
        };

        if !result.is_empty() {
            info!(
                benchmark = name,
                median_ns = result.median() * 1e9,
                mdape = result.median_ape(),
                epochs = result.measurements().len(),
                "benchmark finished"
            );
            if result.is_unstable() {
                warn!(
                    benchmark = name,
                    mdape = result.median_ape(),
                    "unstable result, consider a quieter system or more epochs"
                );
            }
            if self.config.relative && self.baseline.is_none() {
                self.baseline = Some(result.clone());
            }
        }

        self.results.push(result);
        match failure {
            Some(err) => Err(err),
            None => Ok(&self.results[self.results.len() - 1]),
        }
    }

    /// Fit complexity classes to all results tagged with a problem size.
    pub fn complexity_big_o(&self) -> Vec<BigO> {
        big_o(&self.results)
    }

    /// Render all results as a markdown table.
    pub fn render_table(&self) -> String {
        output::format_results(&self.config.title, &self.results, self.baseline.as_ref())
    }

    /// Serialize all results as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        output::to_json_pretty(&self.results)
    }
}
