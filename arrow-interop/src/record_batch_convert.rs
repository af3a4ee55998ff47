//! Buffer allocation by Arrow type and assembly of finished columns into a
//! `RecordBatch`.

use anyhow::{bail, Context, Result};
use arrow_array::types::{
    Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, Time32MillisecondType, Time64MicrosecondType, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType,
};
use arrow_array::{Array, ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{DataType, SchemaRef, TimeUnit};

use crate::byte_buffer::{BinaryColumn, Utf8Column};
use crate::column_buffer::{BooleanColumn, ColumnBuffer, NullColumn, PrimitiveColumn};
use crate::nested_buffer::{ListColumn, StructColumn};

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Allocate an empty buffer able to hold values of `data_type`.
///
/// The concrete buffer type chosen here is the one consumers downcast to when
/// a fresh buffer is handed to them at a batch boundary.
pub fn new_column_buffer(data_type: &DataType, capacity: usize) -> Result<Box<dyn ColumnBuffer>> {
    let buffer: Box<dyn ColumnBuffer> = match data_type {
        DataType::Null => Box::new(NullColumn::new()),
        DataType::Boolean => Box::new(BooleanColumn::with_capacity(capacity)),
        DataType::Int8 => Box::new(PrimitiveColumn::<Int8Type>::with_capacity(capacity)),
        DataType::Int16 => Box::new(PrimitiveColumn::<Int16Type>::with_capacity(capacity)),
        DataType::Int32 => Box::new(PrimitiveColumn::<Int32Type>::with_capacity(capacity)),
        DataType::Int64 => Box::new(PrimitiveColumn::<Int64Type>::with_capacity(capacity)),
        DataType::Float32 => Box::new(PrimitiveColumn::<Float32Type>::with_capacity(capacity)),
        DataType::Float64 => Box::new(PrimitiveColumn::<Float64Type>::with_capacity(capacity)),
        DataType::Decimal128(_, _) => Box::new(PrimitiveColumn::<Decimal128Type>::try_with_data_type(
            data_type.clone(),
            capacity,
        )?),
        DataType::Utf8 => Box::new(Utf8Column::with_capacity(capacity)),
        DataType::Binary => Box::new(BinaryColumn::with_capacity(capacity)),
        DataType::Date32 => Box::new(PrimitiveColumn::<Date32Type>::with_capacity(capacity)),
        DataType::Date64 => Box::new(PrimitiveColumn::<Date64Type>::with_capacity(capacity)),
        DataType::Time32(TimeUnit::Millisecond) => {
            Box::new(PrimitiveColumn::<Time32MillisecondType>::with_capacity(capacity))
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            Box::new(PrimitiveColumn::<Time64MicrosecondType>::with_capacity(capacity))
        }
        DataType::Timestamp(unit, _) => timestamp_buffer(*unit, data_type, capacity)?,
        DataType::List(_) => Box::new(ListColumn::try_new(data_type.clone(), capacity)?),
        DataType::Struct(_) => Box::new(StructColumn::try_new(data_type.clone(), capacity)?),
        other => bail!("No column buffer for Arrow DataType {:?}", other),
    };
    Ok(buffer)
}

fn timestamp_buffer(
    unit: TimeUnit,
    data_type: &DataType,
    capacity: usize,
) -> Result<Box<dyn ColumnBuffer>> {
    let dt = data_type.clone();
    Ok(match unit {
        TimeUnit::Second => Box::new(PrimitiveColumn::<TimestampSecondType>::try_with_data_type(dt, capacity)?),
        TimeUnit::Millisecond => {
            Box::new(PrimitiveColumn::<TimestampMillisecondType>::try_with_data_type(dt, capacity)?)
        }
        TimeUnit::Microsecond => {
            Box::new(PrimitiveColumn::<TimestampMicrosecondType>::try_with_data_type(dt, capacity)?)
        }
        TimeUnit::Nanosecond => {
            Box::new(PrimitiveColumn::<TimestampNanosecondType>::try_with_data_type(dt, capacity)?)
        }
    })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build a `RecordBatch` of `row_count` rows from finished columns, one per
/// schema field and in schema order.
///
/// The explicit row count keeps zero-column schemas meaningful.
pub fn assemble_record_batch(
    schema: SchemaRef,
    columns: Vec<ArrayRef>,
    row_count: usize,
) -> Result<RecordBatch> {
    if columns.len() != schema.fields().len() {
        bail!(
            "Schema has {} fields but {} columns were supplied",
            schema.fields().len(),
            columns.len()
        );
    }
    for (field, column) in schema.fields().iter().zip(&columns) {
        if column.len() != row_count {
            bail!(
                "Column '{}' has {} values, expected {}",
                field.name(),
                column.len(),
                row_count
            );
        }
    }

    let options = RecordBatchOptions::new().with_row_count(Some(row_count));
    RecordBatch::try_new_with_options(schema, columns, &options)
        .context("Building RecordBatch from column buffers")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
