use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use epochbench::statistics::{median, median_absolute_percentage_error, sort_values};
use epochbench::{Bench, Config, Rng};

fn bench_rng(c: &mut Criterion) {
    let mut group = c.benchmark_group("rng");
    let mut rng = Rng::with_seed(1);
    group.bench_function("next", |b| b.iter(|| black_box(rng.next())));
    group.bench_function("uniform01", |b| b.iter(|| black_box(rng.uniform01())));
    group.bench_function("bounded", |b| b.iter(|| black_box(rng.bounded(1_000))));
    group.bench_function("shuffle_1k", |b| {
        b.iter_batched(
            || (0..1_000u32).collect::<Vec<_>>(),
            |mut data| {
                rng.shuffle(&mut data);
                data
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");
    let mut rng = Rng::with_seed(2);
    let samples: Vec<f64> = (0..51).map(|_| 1e-6 * (1.0 + rng.uniform01())).collect();

    group.bench_function("median_mdape_51", |b| {
        b.iter_batched(
            || samples.clone(),
            |mut data| {
                sort_values(&mut data);
                let m = median(&data);
                black_box(median_absolute_percentage_error(&data, m))
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_engine_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(10);
    // Whole calibration cycle on a trivial closure; keeps epochs small to avoid long benches.
    group.bench_function("run_trivial", |b| {
        b.iter(|| {
            let mut bench = Bench::from_config(Config {
                epochs: 5,
                max_epoch_time: Duration::from_micros(200),
                ..Config::default()
            });
            let median = bench.run("add", || black_box(1u64 + 1)).map(|r| r.median());
            black_box(median)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_rng, bench_statistics, bench_engine_overhead);
criterion_main!(benches);
