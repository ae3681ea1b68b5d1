//! Estimate the complexity of sorting shuffled vectors.
//!
//! Run with `cargo run --release --example complexity`.

use epochbench::{do_not_optimize_away_mut, Bench, Rng};
use tracing_subscriber::EnvFilter;

fn main() -> epochbench::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut bench = Bench::new().title("sort_unstable").epochs(21);
    let mut rng = Rng::with_seed(7);

    for n in [100u64, 300, 1_000, 3_000, 10_000, 30_000] {
        let mut data: Vec<u64> = (0..n).collect();
        bench.complexity_n(n).run(&format!("sort {}", n), || {
            rng.shuffle(&mut data);
            data.sort_unstable();
            do_not_optimize_away_mut(&mut data);
        })?;
    }

    println!("{}", bench.render_table());
    println!("best fits:");
    for fit in bench.complexity_big_o() {
        println!("  {}", fit);
    }
    println!("{}", bench.to_json()?);
    Ok(())
}
