//! Benchmarks for the chart pipeline
//!
//! Run with: cargo bench

use bandvis_rs::pipeline::{aggregate, build_chart, scale, ChartView, Resolution};
use bandvis_rs::types::{ClientId, Sample, SeriesKey, VisibilityMap};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Realistic window: hours of telemetry at a 10 second cadence
fn make_samples(count: usize) -> Vec<Sample> {
    let clients = ["tv", "office", "nas", "phone"];
    (0..count)
        .map(|i| {
            let mut sample = Sample::new(Utc.timestamp_opt(i as i64 * 10, 0).unwrap());
            for (n, client) in clients.iter().enumerate() {
                let id = ClientId::from(*client);
                let phase = (i + n * 17) as f64;
                sample.set(SeriesKey::ClientDownload(id.clone()), 40_000.0 + (phase * 0.1).sin() * 10_000.0);
                sample.set(SeriesKey::ClientUpload(id), 2_000.0 + (phase * 0.07).cos() * 500.0);
            }
            sample.set(SeriesKey::StreamBitrate, 8_000.0);
            sample.set(SeriesKey::WanDownload, 160_000.0);
            sample.set(SeriesKey::WanUpload, 16_000.0);
            sample
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1_000, 5_000, 20_000].iter() {
        let samples = make_samples(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("one_minute", size), &samples, |b, samples| {
            b.iter(|| aggregate(black_box(samples), Resolution::Minutes(1.0)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("raw", size), &samples, |b, samples| {
            b.iter(|| aggregate(black_box(samples), Resolution::Raw).unwrap());
        });
    }

    group.finish();
}

fn bench_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale");

    for size in [1_000, 5_000, 20_000].iter() {
        let buckets = aggregate(&make_samples(*size), Resolution::Minutes(1.0)).unwrap();
        let visibility = VisibilityMap::new();

        group.throughput(Throughput::Elements(buckets.len() as u64));
        group.bench_with_input(BenchmarkId::new("dual_polarity", size), &buckets, |b, buckets| {
            b.iter(|| {
                scale(
                    black_box(buckets.clone()),
                    &visibility,
                    |k| k.direction(),
                    false,
                )
            });
        });
    }

    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");

    let samples = make_samples(20_000);
    let view = ChartView {
        resolution: Resolution::Minutes(1.0),
        ..Default::default()
    };

    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("build_chart", |b| {
        b.iter(|| build_chart(black_box(&samples), &view).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_scale, bench_full_pipeline);
criterion_main!(benches);
