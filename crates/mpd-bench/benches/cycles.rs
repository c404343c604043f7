//! Criterion benchmarks for dependency-cycle enumeration.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use mpd_bench::ring_model;
use mpd_test_utils::fixtures::{drift_diffusion_cycle_edges, drift_diffusion_model};

/// Benchmark: all cycles of the authored drift–diffusion graph (24 edges).
fn bench_drift_diffusion_graph(c: &mut Criterion) {
    let model = drift_diffusion_model();

    c.bench_function("cycles_drift_diffusion_full", |b| {
        b.iter(|| black_box(model.enumerate_cycles()));
    });
}

/// Benchmark: validated enumeration over the five-edge loop.
fn bench_drift_diffusion_loop(c: &mut Criterion) {
    let model = drift_diffusion_model();
    let edges = drift_diffusion_cycle_edges();

    c.bench_function("cycles_drift_diffusion_loop", |b| {
        b.iter(|| black_box(model.enumerate_cycles_in(&edges).unwrap()));
    });
}

/// Benchmark: a 64-law ring (128 edges).
fn bench_ring_64(c: &mut Criterion) {
    let model = ring_model(64).unwrap();

    c.bench_function("cycles_ring_64", |b| {
        b.iter(|| black_box(model.enumerate_cycles()));
    });
}

criterion_group!(
    benches,
    bench_drift_diffusion_graph,
    bench_drift_diffusion_loop,
    bench_ring_64
);
criterion_main!(benches);
