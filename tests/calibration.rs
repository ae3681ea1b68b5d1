//! Calibration tests driving the iteration state machine with synthetic clocks.
//!
//! A synthetic clock makes the protocol deterministic: elapsed time is a pure
//! function of the requested iteration count.

use std::time::Duration;

use epochbench::{Config, Error, IterationLogic, Rng, State};

const RESOLUTION: Duration = Duration::from_nanos(100);

fn config(epochs: usize) -> Config {
    Config {
        epochs,
        measurement_seed: Some(7),
        ..Config::default()
    }
}

/// Drive `logic` to completion, timing each epoch with `clock`.
///
/// Gives up after `max_rounds` epochs so a broken protocol fails the test
/// instead of hanging it.
fn drive(logic: &mut IterationLogic, max_rounds: usize, mut clock: impl FnMut(u64) -> Duration) -> usize {
    let mut rounds = 0;
    while logic.num_iters() > 0 && rounds < max_rounds {
        let elapsed = clock(logic.num_iters());
        logic.add(elapsed);
        rounds += 1;
    }
    rounds
}

/// Every recorded epoch must have run at least two thirds of the target.
#[test]
fn recorded_epochs_reach_two_thirds_of_target() {
    let config = config(21);
    let mut logic = IterationLogic::with_clock_resolution("linear", &config, RESOLUTION, false).unwrap();
    let target = logic.target_runtime();

    drive(&mut logic, 1_000, |n| Duration::from_nanos(n * 7));

    assert_eq!(logic.num_iters(), 0);
    assert_eq!(logic.measurements().len(), 21);
    for m in logic.measurements() {
        assert!(
            m.elapsed().as_nanos() * 3 >= target.as_nanos() * 2,
            "epoch of {:?} is below 2/3 of target {:?}",
            m.elapsed(),
            target
        );
    }

    let result = logic.finish().unwrap();
    assert!((result.median() - 7e-9).abs() < 1e-12);
    assert!(result.median_ape() < 1e-9);
}

/// Convergence holds with a noisy (but bounded) per-iteration cost.
#[test]
fn converges_under_noise() {
    let config = config(51);
    let mut logic = IterationLogic::with_clock_resolution("noisy", &config, RESOLUTION, false).unwrap();
    let target = logic.target_runtime();
    let mut noise = Rng::with_seed(99);

    drive(&mut logic, 1_000, |n| {
        let per_iter = 20.0 * (1.0 + 0.05 * noise.uniform01());
        Duration::from_nanos((n as f64 * per_iter) as u64)
    });

    assert_eq!(logic.measurements().len(), 51);
    assert!(logic
        .measurements()
        .iter()
        .all(|m| m.elapsed().as_nanos() * 3 >= target.as_nanos() * 2));
    let result = logic.finish().unwrap();
    assert!(!result.is_unstable());
}

/// An operation that never takes measurable time overflows the iteration count.
#[test]
fn zero_elapsed_overflows() {
    let config = config(11);
    let mut logic = IterationLogic::with_clock_resolution("empty", &config, RESOLUTION, false).unwrap();

    let rounds = drive(&mut logic, 100, |_| Duration::ZERO);

    // 1, 10, ..., 10^19 requested before the next x10 leaves u64.
    assert_eq!(rounds, 20);
    assert!(matches!(logic.failure(), Some(Error::IterationOverflow { .. })));
    let err = logic.finish().unwrap_err();
    assert!(err.to_string().contains("optimized away"));
}

/// Warmup is run once and never recorded.
#[test]
fn warmup_is_not_recorded() {
    let config = Config {
        warmup: 50_000,
        ..config(5)
    };
    let mut logic = IterationLogic::with_clock_resolution("warm", &config, RESOLUTION, false).unwrap();
    assert_eq!(logic.state(), State::Warmup);
    assert_eq!(logic.num_iters(), 50_000);

    // 50k * 2ns = 100us, right on target: skips upscaling.
    logic.add(Duration::from_micros(100));
    assert_eq!(logic.state(), State::Measuring);
    assert!(logic.measurements().is_empty());

    drive(&mut logic, 100, |n| Duration::from_nanos(n * 2));
    assert_eq!(logic.measurements().len(), 5);
}

/// A fixed epoch iteration count bypasses calibration entirely.
#[test]
fn fixed_epoch_iterations() {
    let config = Config {
        epoch_iterations: 123,
        ..config(9)
    };
    let mut logic = IterationLogic::with_clock_resolution("fixed", &config, RESOLUTION, false).unwrap();
    assert_eq!(logic.state(), State::Measuring);

    // Far below target, but fixed counts are recorded as they come.
    drive(&mut logic, 100, |n| Duration::from_nanos(n));
    assert_eq!(logic.measurements().len(), 9);
    assert!(logic.measurements().iter().all(|m| m.iterations() == 123));
}

/// Endless mode requests the maximum count and never records anything.
#[test]
fn endless_never_finishes() {
    let config = config(3);
    let mut logic = IterationLogic::with_clock_resolution("spin", &config, RESOLUTION, true).unwrap();
    assert_eq!(logic.state(), State::Endless);

    for _ in 0..10 {
        assert_eq!(logic.num_iters(), u64::MAX);
        logic.add(Duration::from_secs(1));
    }
    assert!(logic.measurements().is_empty());
    assert!(matches!(logic.finish(), Err(Error::Incomplete { recorded: 0, epochs: 3 })));
}

/// Same seed and same clock produce the same iteration schedule.
#[test]
fn schedule_is_reproducible() {
    let schedule = || {
        let config = config(15);
        let mut logic = IterationLogic::with_clock_resolution("repro", &config, RESOLUTION, false).unwrap();
        let mut counts = Vec::new();
        drive(&mut logic, 1_000, |n| {
            counts.push(n);
            Duration::from_nanos(n * 13)
        });
        counts
    };
    assert_eq!(schedule(), schedule());
}
