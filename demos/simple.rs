//! Compare a few ways of summing a vector.
//!
//! Run with `cargo run --release --example simple`. Set `RUST_LOG=debug` to
//! watch calibration, or `EPOCHBENCH_ENDLESS="fold"` to spin one benchmark
//! forever under a profiler.

use epochbench::{do_not_optimize_away, Bench, Rng};
use tracing_subscriber::EnvFilter;

fn main() -> epochbench::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = Rng::with_seed(42);
    let data: Vec<u32> = (0..1_024).map(|_| rng.bounded(1_000)).collect();

    let mut bench = Bench::new()
        .title("summing 1024 u32")
        .unit("elem")
        .batch(data.len() as f64)
        .relative(true);

    bench.run("for loop", || {
        let mut sum = 0u64;
        for &x in &data {
            sum += u64::from(x);
        }
        do_not_optimize_away(&sum);
    })?;

    bench.run("iter sum", || {
        let sum: u64 = data.iter().map(|&x| u64::from(x)).sum();
        do_not_optimize_away(&sum);
    })?;

    bench.run("fold", || {
        let sum = data.iter().fold(0u64, |acc, &x| acc + u64::from(x));
        do_not_optimize_away(&sum);
    })?;

    println!("{}", bench.render_table());
    Ok(())
}
