//! Criterion benchmarks for relaxation passes and state operations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mpd_bench::{drift_diffusion_profile, halving_profile};
use mpd_test_utils::fixtures::CYCLE_STEP;

/// Benchmark: relax the drift–diffusion cycle over 1K points.
fn bench_drift_diffusion_1k(c: &mut Criterion) {
    let seeded = drift_diffusion_profile(1_000);

    c.bench_function("drift_diffusion_cycle_1k", |b| {
        b.iter_batched(
            || seeded.clone(),
            |mut state| {
                let report = state.solve(CYCLE_STEP, 1e-3, 10_000).unwrap();
                black_box(report);
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark: 20 halving passes over 100K points.
fn bench_halving_100k(c: &mut Criterion) {
    let fresh = halving_profile(100_000);

    c.bench_function("halving_100k_20_passes", |b| {
        b.iter_batched(
            || fresh.clone(),
            |mut state| {
                let report = state.solve("halving", 1e-6, 100).unwrap();
                black_box(report);
            },
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: blend two 100K-point states.
fn bench_interpolate_100k(c: &mut Criterion) {
    let other = halving_profile(100_000);
    let mut target = halving_profile(100_000);
    target.set_scalar("x", 1.0).unwrap();

    c.bench_function("interpolate01_100k", |b| {
        b.iter(|| {
            target.interpolate01(black_box(&other), 0.5).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_drift_diffusion_1k,
    bench_halving_100k,
    bench_interpolate_100k
);
criterion_main!(benches);
