//! Criterion benchmarks for the MMAC crossing engine and drivers.
//!
//! Uses synthetic layered graphs with a fixed seed so that runs are
//! comparable across changes.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mmac_heur::aco::{AcoConfig, AcoRunner};
use mmac_heur::ga::{GaConfig, GaRunner};
use mmac_heur::instance::InstanceData;
use mmac_heur::local_search::{LocalSearchConfig, LocalSearchRunner};
use mmac_heur::random::create_rng;
use mmac_heur::solution::Solution;
use rand::Rng;

// ===========================================================================
// Synthetic instances
// ===========================================================================

/// `layers` layers of `width` nodes, `density` edges per node between
/// consecutive layers, drawn uniformly.
fn layered_instance(layers: usize, width: usize, density: usize) -> Arc<InstanceData> {
    let mut rng = create_rng(7);
    let mut edges = Vec::new();
    for l in 0..layers - 1 {
        for _ in 0..width * density {
            let a = rng.random_range(0..width);
            let b = rng.random_range(0..width);
            edges.push((l * width + a + 1, (l + 1) * width + b + 1));
        }
    }
    Arc::new(InstanceData::new(vec![width; layers], &edges).expect("valid synthetic instance"))
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_full_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_evaluation");

    for (layers, width) in [(5usize, 10usize), (10, 20), (20, 30)] {
        let instance = layered_instance(layers, width, 2);
        let mut rng = create_rng(42);
        let solution = Solution::shuffled(1, instance, &mut rng);
        group.bench_with_input(
            BenchmarkId::new(format!("l{}_w{}", layers, width), layers * width),
            &solution,
            |b, s| {
                b.iter(|| {
                    let mut sol = s.clone();
                    sol.calc_all_node_max_cross();
                    black_box(sol.objective())
                })
            },
        );
    }
    group.finish();
}

fn bench_local_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_search");
    group.sample_size(10);

    for (layers, width) in [(5usize, 10usize), (10, 20)] {
        let instance = layered_instance(layers, width, 2);
        let mut rng = create_rng(42);
        let solution = Solution::random(1, instance, &mut rng);
        let config = LocalSearchConfig::default();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("l{}_w{}", layers, width)),
            &(solution, config),
            |b, (s, c)| {
                b.iter(|| {
                    let mut rng = create_rng(1);
                    let result = LocalSearchRunner::run(black_box(s), black_box(c), &mut rng);
                    black_box(result.best_objective)
                })
            },
        );
    }
    group.finish();
}

fn bench_ga(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga");
    group.sample_size(10);

    for (layers, width, gen) in [(5usize, 10usize, 20usize), (10, 20, 10)] {
        let instance = layered_instance(layers, width, 2);
        let config = GaConfig::default()
            .with_population_size(60)
            .with_selected_size(12)
            .with_seed(42)
            .with_max_generations(gen);
        group.bench_with_input(
            BenchmarkId::new(format!("l{}_w{}_g{}", layers, width, gen), layers * width),
            &(instance, config),
            |b, (inst, c)| {
                b.iter(|| {
                    let result = GaRunner::run(Arc::clone(inst), black_box(c));
                    black_box(result.map(|r| r.best_objective))
                })
            },
        );
    }
    group.finish();
}

fn bench_aco(c: &mut Criterion) {
    let mut group = c.benchmark_group("aco");
    group.sample_size(10);

    for (layers, width, colonies) in [(5usize, 10usize, 5usize), (10, 20, 2)] {
        let instance = layered_instance(layers, width, 2);
        let config = AcoConfig::default()
            .with_ants(20)
            .with_seed(42)
            .with_max_colonies(colonies);
        group.bench_with_input(
            BenchmarkId::new(format!("l{}_w{}_c{}", layers, width, colonies), layers * width),
            &(instance, config),
            |b, (inst, c)| {
                b.iter(|| {
                    let result = AcoRunner::run(Arc::clone(inst), black_box(c));
                    black_box(result.map(|r| r.best_objective))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_full_evaluation, bench_local_search, bench_ga, bench_aco);
criterion_main!(benches);
