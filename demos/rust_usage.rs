use std::sync::Arc;

use anyhow::Result;
use arrow_array::cast::AsArray;
use arrow_array::types::Int64Type;
use arrow_array::Array;
use arrow_schema::{DataType, Field, Fields, Schema, TimeUnit};
use chrono::{FixedOffset, NaiveDate};
use rowset_arrow::{collect_batches, ConsumerConfig, MemoryRowSource, RowBatchIterator, Value};
use rust_decimal::Decimal;
use tracing::{info, Level};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    info!("Row set to Arrow - Rust Examples");

    // Example 1: Flat columns in fixed-size batches
    batched_example()?;

    // Example 2: Timestamps read under a calendar offset
    calendar_example()?;

    // Example 3: Nested list and struct columns
    nested_example()?;

    Ok(())
}

fn orders() -> Vec<Vec<Value>> {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    (0..7_i64)
        .map(|i| {
            vec![
                Value::Int(i),
                Value::Text(format!("customer-{}", i % 3)),
                if i % 4 == 3 { Value::Null } else { Value::Decimal(Decimal::new(1250 + i * 100, 2)) },
                Value::Date(day + chrono::Duration::days(i)),
            ]
        })
        .collect()
}

fn batched_example() -> Result<()> {
    info!("=== Example 1: Batched scan ===");

    let schema = Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Int64, false),
        Field::new("customer", DataType::Utf8, true),
        Field::new("amount", DataType::Decimal128(12, 2), true),
        Field::new("placed", DataType::Date32, true),
    ]));
    let config = ConsumerConfig::default().with_target_batch_size(3);
    let mut batches = RowBatchIterator::new(MemoryRowSource::from_rows(orders()), schema, config)?;

    while let Some(batch) = batches.next_batch()? {
        let ids = batch.column(0).as_primitive::<Int64Type>();
        info!(
            "Batch of {} rows, order ids {:?}, {} null amounts",
            batch.num_rows(),
            ids.values(),
            batch.column(2).null_count()
        );
    }
    info!(
        "Read {} rows in {} batches with {} resets",
        batches.rows_read(),
        batches.batches_emitted(),
        batches.reset_count()
    );

    Ok(())
}

fn calendar_example() -> Result<()> {
    info!("=== Example 2: Calendar offset ===");

    let schema = Arc::new(Schema::new(vec![Field::new(
        "created",
        DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into())),
        true,
    )]));
    let wall = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    let rows = || MemoryRowSource::single_column([Value::Timestamp(wall)]);

    for hours in [0, 2, -5] {
        let offset = FixedOffset::east_opt(hours * 3600).unwrap();
        let config = ConsumerConfig::default().with_calendar(offset);
        let batches = collect_batches(rows(), schema.clone(), config)?;
        let stored = batches[0]
            .column(0)
            .as_primitive::<arrow_array::types::TimestampMillisecondType>()
            .value(0);
        info!("Wall clock {} at {} is {} ms since epoch", wall, offset, stored);
    }

    Ok(())
}

fn nested_example() -> Result<()> {
    info!("=== Example 3: Nested columns ===");

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "tags",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
        Field::new(
            "address",
            DataType::Struct(Fields::from(vec![
                Field::new("city", DataType::Utf8, true),
                Field::new("zip", DataType::Int32, true),
            ])),
            true,
        ),
    ]));
    let rows = vec![
        vec![
            Value::Array(vec!["new".into(), "priority".into()]),
            Value::Struct(vec!["Lisbon".into(), Value::Int(1100)]),
        ],
        vec![Value::Null, Value::Null],
        vec![Value::Array(Vec::new()), Value::Struct(vec!["Porto".into(), Value::Null])],
    ];

    let batches = collect_batches(MemoryRowSource::from_rows(rows), schema, ConsumerConfig::default())?;
    let batch = &batches[0];
    let tags = batch.column(0).as_list::<i32>();
    let address = batch.column(1).as_struct();
    for row in 0..batch.num_rows() {
        info!(
            "Row {}: {} tags, address {}",
            row,
            if tags.is_null(row) { 0 } else { tags.value(row).len() },
            if address.is_null(row) { "missing" } else { "present" }
        );
    }

    Ok(())
}
