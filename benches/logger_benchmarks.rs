//! Criterion benchmarks for rust_event_logger

use chrono::TimeZone;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_event_logger::prelude::*;
use std::sync::Arc;

fn sink_logger(options: Options) -> Logger {
    Logger::new(options.with_writer(std::io::sink())).expect("Failed to build logger")
}

// ============================================================================
// Event Pool Benchmarks
// ============================================================================

fn bench_event_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_pool");
    group.throughput(Throughput::Elements(1));

    let engine = Arc::new(Engine::builder().build());
    let pool = EventPool::new();

    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let event = pool.acquire(&engine, LogLevel::Info);
            pool.release(black_box(event));
        });
    });

    group.bench_function("acquire_fill_release", |b| {
        b.iter(|| {
            let event = pool
                .acquire(&engine, LogLevel::Info)
                .str("user", "ada")
                .int("attempt", 3)
                .bool("admin", false);
            pool.release(black_box(event));
        });
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let plain = sink_logger(Options::default());
    let pretty = sink_logger(Options::default().with_pretty(true));

    group.bench_function("plain_no_fields", |b| {
        b.iter(|| plain.info().msg(black_box("Info message")));
    });

    group.bench_function("plain_with_fields", |b| {
        b.iter(|| {
            plain
                .info()
                .str("method", "GET")
                .int("status", 200)
                .float64("latency_ms", 12.5)
                .msg(black_box("request served"))
        });
    });

    group.bench_function("pretty_with_error", |b| {
        b.iter(|| {
            pretty
                .error()
                .str("method", "GET")
                .err("connection reset")
                .msg(black_box("request failed"))
        });
    });

    group.bench_function("filtered_debug", |b| {
        b.iter(|| plain.debug().str("k", "v").msg(black_box("Debug message")));
    });

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    let logger = sink_logger(Options::default());

    for threads in [2usize, 4, 8] {
        group.throughput(Throughput::Elements((threads * 100) as u64));
        group.bench_function(format!("{}_threads", threads), |b| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let logger = logger.clone();
                        std::thread::spawn(move || {
                            for i in 0..100 {
                                logger.info().int("t", t as isize).int("i", i).send();
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Encoder Benchmarks
// ============================================================================

fn bench_encoders(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoders");
    group.throughput(Throughput::Elements(1));

    let time = chrono_tz::Asia::Shanghai
        .with_ymd_and_hms(2024, 3, 10, 8, 0, 0)
        .unwrap();
    let entry = Entry::new(LogLevel::Error, time, "request failed");
    let fields = vec![
        Field::new("method", "GET"),
        Field::new("status", 500),
        Field::new("error", FieldValue::Error("boom".to_string())),
    ];

    let json = JsonEncoder::new();
    let console = ConsoleEncoder::new();
    let color = ColorConsoleEncoder::default();

    group.bench_function("json", |b| {
        b.iter(|| black_box(json.encode_entry(&entry, &[], &fields)));
    });

    group.bench_function("console", |b| {
        b.iter(|| black_box(console.encode_entry(&entry, &[], &fields)));
    });

    group.bench_function("color_console", |b| {
        b.iter(|| black_box(color.encode_entry(&entry, &[], &fields)));
    });

    group.finish();
}

// ============================================================================
// Scheduler Benchmarks
// ============================================================================

fn bench_next_midnight(c: &mut Criterion) {
    let now = chrono_tz::America::New_York
        .with_ymd_and_hms(2024, 3, 9, 18, 30, 0)
        .unwrap();

    c.bench_function("next_midnight", |b| {
        b.iter(|| black_box(rust_event_logger::core::duration_until_next_midnight(black_box(&now))));
    });
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_event_pool,
    bench_logging,
    bench_concurrent_logging,
    bench_encoders,
    bench_next_midnight
);

criterion_main!(benches);
