//! Benchmarks for the row-to-column path.
//!
//! Run with:  `cargo bench`

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rowset_arrow::{collect_batches, ConsumerConfig, MemoryRowSource, Value};

const ROWS: usize = 100_000;

fn int_rows() -> (SchemaRef, MemoryRowSource) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Int8, true),
        Field::new("b", DataType::Int64, false),
    ]));
    let rows = (0..ROWS)
        .map(|i| {
            let a = if i % 10 == 0 { Value::Null } else { Value::Int((i % 100) as i64) };
            vec![a, Value::Int(i as i64)]
        })
        .collect();
    (schema, MemoryRowSource::from_rows(rows))
}

fn mixed_rows() -> (SchemaRef, MemoryRowSource) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("at", DataType::Timestamp(TimeUnit::Microsecond, None), true),
        Field::new(
            "tags",
            DataType::List(Arc::new(Field::new("item", DataType::Int32, true))),
            true,
        ),
    ]));
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let rows = (0..ROWS)
        .map(|i| {
            vec![
                Value::Text(format!("user-{}", i)),
                Value::Timestamp(start + Duration::seconds(i as i64)),
                Value::Array((0..(i % 4) as i32).map(Value::from).collect()),
            ]
        })
        .collect();
    (schema, MemoryRowSource::from_rows(rows))
}

fn bench_primitive_columns(c: &mut Criterion) {
    let (schema, source) = int_rows();
    let mut group = c.benchmark_group("primitive_columns");
    group.throughput(Throughput::Elements(ROWS as u64));

    for batch_size in [1024, 16 * 1024] {
        group.bench_with_input(BenchmarkId::new("batch_size", batch_size), &batch_size, |b, &n| {
            let config = ConsumerConfig::default().with_target_batch_size(n);
            b.iter(|| {
                let batches =
                    collect_batches(source.clone(), schema.clone(), config.clone()).unwrap();
                black_box(batches);
            })
        });
    }
    group.finish();
}

fn bench_buffer_reuse(c: &mut Criterion) {
    let (schema, source) = int_rows();
    let mut group = c.benchmark_group("buffer_reset");
    group.throughput(Throughput::Elements(ROWS as u64));

    for reuse in [true, false] {
        group.bench_with_input(BenchmarkId::new("reuse_vectors", reuse), &reuse, |b, &reuse| {
            let config = ConsumerConfig::default()
                .with_target_batch_size(1024)
                .with_reuse_vectors(reuse);
            b.iter(|| {
                let batches =
                    collect_batches(source.clone(), schema.clone(), config.clone()).unwrap();
                black_box(batches);
            })
        });
    }
    group.finish();
}

fn bench_mixed_columns(c: &mut Criterion) {
    let (schema, source) = mixed_rows();
    c.bench_function("mixed_columns", |b| {
        b.iter(|| {
            let batches =
                collect_batches(source.clone(), schema.clone(), ConsumerConfig::default()).unwrap();
            black_box(batches);
        })
    });
}

criterion_group!(benches, bench_primitive_columns, bench_buffer_reuse, bench_mixed_columns);
criterion_main!(benches);
