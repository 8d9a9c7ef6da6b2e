//! Ensemble benchmarks for stroke_experiments using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stroke_experiments::run_ensemble;
use stroke_sim::scenario::{NetworkConfig, SimulationParams};

fn bench_ensemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("ensemble");
    group.sample_size(10);
    for threads in [1usize, 4] {
        let config = NetworkConfig::reference().with_params(
            SimulationParams::default()
                .with_duration(365.0)
                .with_replications(16),
        );
        group.bench_with_input(
            BenchmarkId::new("reference_16", threads),
            &config,
            |b, config| {
                b.iter(|| {
                    black_box(run_ensemble(config, 42, Some(threads), false).expect("ensemble"))
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_ensemble);
criterion_main!(benches);
