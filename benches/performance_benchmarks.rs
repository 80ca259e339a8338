use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use liftrs::models::{Cell, HrStream, Workout};
use liftrs::muscles::CustomMappings;
use liftrs::sheet::parse_worksheet;
use liftrs::{HistoryCalculator, PeakDetector, SetHrCorrelator, StatsAggregator};

/// Performance benchmarks for the parsing and analytics core
///
/// Sizes are chosen around a real log: a few hundred sheets and
/// workout-length heart-rate streams sampled at 1 Hz.

const EXERCISES: &[&str] = &[
    "Bench Press",
    "Div. Seated row",
    "Cable shoulder press",
    "Squat",
    "Romanian Deadlift",
    "Sled Push",
];

fn create_sheet(rows: usize) -> Vec<Vec<Cell>> {
    let mut grid = vec![vec![
        Cell::from("Exercise"),
        Cell::from("Sets"),
        Cell::from("Max Weight"),
        Cell::from("Reps"),
        Cell::from("Volume"),
    ]];
    for i in 0..rows {
        let base = 100.0 + (i % 10) as f64 * 10.0;
        grid.push(vec![
            Cell::from(EXERCISES[i % EXERCISES.len()]),
            Cell::from(format!("{},{},{}", base, base + 10.0, base + 20.0)),
            Cell::Number(base + 20.0),
            Cell::from("10,8,6"),
            if i % 2 == 0 { Cell::Empty } else { Cell::Number(base * 24.0) },
        ]);
    }
    grid
}

fn create_workouts(count: usize) -> Vec<Workout> {
    let custom = CustomMappings::new();
    let grid = create_sheet(8);
    (0..count)
        .map(|i| {
            let label = format!("{}/{}/2025", i % 12 + 1, i % 28 + 1);
            parse_worksheet(&label, &grid, &custom)
        })
        .collect()
}

/// Interval-style stream: baseline with an effort spike every `period` seconds
fn create_stream(seconds: usize, period: usize) -> HrStream {
    let hr = (0..seconds)
        .map(|t| {
            let phase = (t % period) as f64 / period as f64;
            let spike = (-((phase - 0.5) * 12.0).powi(2)).exp();
            105.0 + 55.0 * spike
        })
        .collect();
    HrStream::new((0..seconds).map(|t| t as f64).collect(), hr)
}

fn bench_parse_worksheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("Worksheet Parsing");
    let custom = CustomMappings::new();

    for &rows in &[10, 100, 1000] {
        let grid = create_sheet(rows);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("parse_worksheet", rows), &grid, |b, grid| {
            b.iter(|| parse_worksheet(black_box("1/29/2026"), black_box(grid), &custom));
        });
    }

    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Aggregation");

    for &count in &[10, 100, 500] {
        let workouts = create_workouts(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", count), &workouts, |b, w| {
            b.iter(|| StatsAggregator::aggregate(black_box(w)));
        });
        group.bench_with_input(BenchmarkId::new("muscle_volume", count), &workouts, |b, w| {
            b.iter(|| StatsAggregator::muscle_volume(black_box(w)));
        });
        group.bench_with_input(BenchmarkId::new("history", count), &workouts, |b, w| {
            b.iter(|| HistoryCalculator::history(black_box("Squat"), None, black_box(w)));
        });
    }

    group.finish();
}

fn bench_peak_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Peak Detection");
    let detector = PeakDetector::new();

    for &seconds in &[600, 3600, 7200] {
        let stream = create_stream(seconds, 150);

        group.throughput(Throughput::Elements(seconds as u64));
        group.bench_with_input(BenchmarkId::new("detect", seconds), &stream, |b, stream| {
            b.iter(|| detector.detect(black_box(stream)));
        });
    }

    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let stream = create_stream(3600, 150);
    let peaks = PeakDetector::new().detect(&stream);
    let sets = create_workouts(1)[0].sets();
    let correlator = SetHrCorrelator::new();

    c.bench_function("correlate_sets", |b| {
        b.iter(|| correlator.correlate(black_box(&sets), black_box(&peaks), &stream, None));
    });
}

criterion_group!(
    benches,
    bench_parse_worksheet,
    bench_aggregation,
    bench_peak_detection,
    bench_correlation
);
criterion_main!(benches);
