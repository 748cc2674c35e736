//! Benchmarks for trend policy evaluation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use proximity_monitor::trend::{
    delta::DeltaPolicy, monotonic_run::MonotonicRunPolicy, split_average::SplitAveragePolicy, HistoryWindow,
    TrendEstimator, TrendPolicy,
};

fn policies() -> Vec<(&'static str, Box<dyn TrendPolicy>)> {
    vec![
        ("delta", Box::new(DeltaPolicy::new(2000.0)) as Box<dyn TrendPolicy>),
        ("split_average", Box::new(SplitAveragePolicy::new(0.2))),
        ("monotonic_run", Box::new(MonotonicRunPolicy::new())),
    ]
}

/// Noisy approach: growing extent with uniform jitter
fn noisy_ramp(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 10_000.0 + 400.0 * i as f64 + 1_500.0 * (rand::random::<f64>() - 0.5))
        .collect()
}

fn benchmark_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_estimate");

    for window_size in [5, 15, 60] {
        let mut window = HistoryWindow::new(window_size);
        for extent in noisy_ramp(window_size) {
            window.push(extent);
        }

        for (name, policy) in policies() {
            group.bench_with_input(BenchmarkId::new(name, window_size), &window, |b, window| {
                b.iter(|| black_box(policy.estimate(black_box(window))));
            });
        }
    }

    group.finish();
}

fn benchmark_estimator_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimator_sequence_1000");
    let data = noisy_ramp(1000);

    for (name, policy) in policies() {
        let mut estimator = match TrendEstimator::new(policy, 15) {
            Ok(estimator) => estimator,
            Err(e) => panic!("Failed to create estimator: {e}"),
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                estimator.reset();
                for &extent in data {
                    black_box(estimator.observe(black_box(extent)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_estimate, benchmark_estimator_sequence);
criterion_main!(benches);
