//! CI Performance Suite - performance regression testing for CI/CD
//!
//! Covers the stages that dominate request time:
//!
//! 1. Non-periodic tetrahedralization at a few scales
//! 2. Periodic tetrahedralization (27 images per point) at the same scales
//! 3. Coordinate normalization
//! 4. The exact insphere predicate
//!
//! Seeds are fixed so runs are comparable across commits.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use periodic_delaunay::core::normalize::normalize;
use periodic_delaunay::core::pipeline::compute_delaunay;
use periodic_delaunay::geometry::point::GridPoint;
use periodic_delaunay::geometry::predicates::insphere;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// Point counts used across the triangulation benchmarks
const COUNTS: &[usize] = &[100, 500, 2_000];

fn random_points(count: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..3 * count).map(|_| rng.random_range(0.0..1.0)).collect()
}

macro_rules! benchmark_mode {
    ($func_name:ident, $group:literal, $periodic:expr, $seed:literal, $samples:literal) => {
        fn $func_name(c: &mut Criterion) {
            let mut group = c.benchmark_group($group);
            group.sample_size($samples);
            for &count in COUNTS {
                let points = random_points(count, $seed);
                group.throughput(Throughput::Elements(count as u64));
                group.bench_with_input(BenchmarkId::new("compute_delaunay", count), &count, |b, &count| {
                    b.iter(|| {
                        let cells = compute_delaunay(black_box(&points), count, $periodic)
                            .unwrap_or_else(|err| panic!("{} points: {err}", count));
                        black_box(cells)
                    });
                });
            }
            group.finish();
        }
    };
}

benchmark_mode!(benchmark_non_periodic, "non_periodic", false, 101, 25);
benchmark_mode!(benchmark_periodic, "periodic", true, 202, 15);

fn benchmark_normalize(c: &mut Criterion) {
    let raw: Vec<f64> = random_points(10_000, 303).iter().map(|x| 8.0f64.mul_add(*x, -4.0)).collect();
    c.bench_function("normalize_10k", |b| {
        b.iter(|| black_box(normalize(black_box(&raw), 10_000)));
    });
}

fn benchmark_insphere(c: &mut Criterion) {
    let simplex = [
        GridPoint::new([0, 0, 0]),
        GridPoint::new([1 << 36, 0, 0]),
        GridPoint::new([0, 1 << 36, 0]),
        GridPoint::new([0, 0, 1 << 36]),
    ];
    let inside = GridPoint::new([1 << 34, 1 << 34, 1 << 34]);
    let cospherical = GridPoint::new([1 << 36, 1 << 36, 0]);
    c.bench_function("insphere_generic", |b| {
        b.iter(|| black_box(insphere(black_box(&simplex), black_box(&inside))));
    });
    c.bench_function("insphere_cospherical", |b| {
        b.iter(|| black_box(insphere(black_box(&simplex), black_box(&cospherical))));
    });
}

criterion_group!(
    benches,
    benchmark_non_periodic,
    benchmark_periodic,
    benchmark_normalize,
    benchmark_insphere
);
criterion_main!(benches);
