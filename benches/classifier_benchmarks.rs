//! Benchmarks for the full classifier and the replay pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proximity_monitor::{
    classifier::ProximityClassifier,
    config::Config,
    debounce::StateDebouncer,
    pipeline,
    source::{ExtentFileSource, ReplaySource},
    trend::TrendSignal,
};

/// Approach, hold, recede cycles with measurement noise
fn session(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let phase = (i % 60) as f64;
            let base = if phase < 20.0 {
                10_000.0 + 1_000.0 * phase
            } else if phase < 40.0 {
                30_000.0
            } else {
                30_000.0 - 1_000.0 * (phase - 40.0)
            };
            base + 800.0 * (rand::random::<f64>() - 0.5)
        })
        .collect()
}

fn classifier(policy: &str) -> ProximityClassifier {
    let mut config = Config::default();
    if let Err(e) = config.trend.set_policy(policy) {
        panic!("Invalid policy {policy}: {e}");
    }
    match config.create_classifier() {
        Ok(classifier) => classifier,
        Err(e) => panic!("Failed to create classifier: {e}"),
    }
}

fn benchmark_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("classifier_tick");
    let data = session(600);
    group.throughput(Throughput::Elements(data.len() as u64));

    for policy in ["delta", "split_average", "monotonic_run"] {
        group.bench_with_input(BenchmarkId::from_parameter(policy), &data, |b, data| {
            b.iter(|| {
                let mut classifier = classifier(policy);
                for &extent in data {
                    let _ = black_box(classifier.tick(black_box(extent)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_debouncer(c: &mut Criterion) {
    let trends: Vec<TrendSignal> = (0..1000)
        .map(|_| match rand::random::<u8>() % 3 {
            0 => TrendSignal::Increasing,
            1 => TrendSignal::Decreasing,
            _ => TrendSignal::Flat,
        })
        .collect();

    c.bench_function("debouncer_update_1000", |b| {
        let mut debouncer = StateDebouncer::new(2);
        b.iter(|| {
            debouncer.reset();
            for &trend in &trends {
                black_box(debouncer.update(black_box(trend)));
            }
        });
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let data = session(600);
    let text: String = data.iter().map(|e| format!("{e:.1}\n")).collect();

    group.bench_function("replay_source", |b| {
        b.iter(|| {
            let mut source = ReplaySource::new(data.iter().copied());
            black_box(pipeline::run(&mut source, &mut classifier("delta")))
        });
    });

    group.bench_function("extent_text", |b| {
        b.iter(|| {
            let mut source = ExtentFileSource::new(text.as_bytes());
            black_box(pipeline::run(&mut source, &mut classifier("delta")))
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_tick, benchmark_debouncer, benchmark_pipeline);
criterion_main!(benches);
