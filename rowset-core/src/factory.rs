//! Consumer construction by Arrow type.

use arrow_array::types::{
    ArrowTimestampType, Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type,
    Int16Type, Int32Type, Int64Type, Int8Type, Time32MillisecondType, Time64MicrosecondType,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use arrow_interop::{
    BinaryColumn, BooleanColumn, ListColumn, NullColumn, PrimitiveColumn, StructColumn, Utf8Column,
};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::FixedOffset;
use tracing::debug;

use crate::config::ConsumerConfig;
use crate::consumer::binary::{BinaryCodec, Utf8Codec};
use crate::consumer::decimal::DecimalCodec;
use crate::consumer::nested::{ListCodec, StructCodec};
use crate::consumer::null::NullCodec;
use crate::consumer::primitive::{BooleanCodec, PrimitiveCodec, ReadPrimitive};
use crate::consumer::temporal::{DateCodec, DateEncoding, TimeCodec, TimeEncoding, TimestampCodec};
use crate::consumer::{boxed_consumer, ColumnConsumer, NullMode};
use crate::error::{ConsumerError, Result};
use crate::row_source::ARRAY_VALUE_COLUMN;

/// Build the consumer for `field`, reading ordinal `column_index` of the
/// row source.
///
/// Fails with [`ConsumerError::Configuration`] for types no consumer
/// handles; nothing is read from any source here.
pub fn create_consumer(
    field: &Field,
    column_index: usize,
    config: &ConsumerConfig,
) -> Result<Box<dyn ColumnConsumer>> {
    let capacity = config.buffer_capacity();
    let mode = NullMode::for_field(field.is_nullable(), config.strict_nullability);
    let data_type = field.data_type();
    debug!(
        "Creating {:?} consumer for column {} ('{}'), {:?}",
        data_type,
        column_index,
        field.name(),
        mode
    );

    let consumer = match data_type {
        // Nothing is read, so there is no NULL to check.
        DataType::Null => boxed_consumer(NullColumn::new(), NullCodec, column_index, NullMode::NonNullable),
        DataType::Boolean => {
            boxed_consumer(BooleanColumn::with_capacity(capacity), BooleanCodec, column_index, mode)
        }
        DataType::Int8 => primitive::<Int8Type>(capacity, column_index, mode),
        DataType::Int16 => primitive::<Int16Type>(capacity, column_index, mode),
        DataType::Int32 => primitive::<Int32Type>(capacity, column_index, mode),
        DataType::Int64 => primitive::<Int64Type>(capacity, column_index, mode),
        DataType::Float32 => primitive::<Float32Type>(capacity, column_index, mode),
        DataType::Float64 => primitive::<Float64Type>(capacity, column_index, mode),
        DataType::Decimal128(precision, scale) => {
            let codec = DecimalCodec::try_new(*precision, *scale, config.decimal_rounding)?;
            let vector =
                PrimitiveColumn::<Decimal128Type>::try_with_data_type(data_type.clone(), capacity)?;
            boxed_consumer(vector, codec, column_index, mode)
        }
        DataType::Utf8 => boxed_consumer(Utf8Column::with_capacity(capacity), Utf8Codec, column_index, mode),
        DataType::Binary => {
            boxed_consumer(BinaryColumn::with_capacity(capacity), BinaryCodec, column_index, mode)
        }
        DataType::Date32 => date::<Date32Type>(capacity, column_index, mode),
        DataType::Date64 => date::<Date64Type>(capacity, column_index, mode),
        DataType::Time32(TimeUnit::Millisecond) => {
            time::<Time32MillisecondType>(capacity, column_index, mode)
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            time::<Time64MicrosecondType>(capacity, column_index, mode)
        }
        DataType::Timestamp(unit, _) => {
            let calendar = config.calendar;
            match unit {
                TimeUnit::Second => {
                    timestamp::<TimestampSecondType>(data_type, capacity, column_index, mode, calendar)?
                }
                TimeUnit::Millisecond => timestamp::<TimestampMillisecondType>(
                    data_type,
                    capacity,
                    column_index,
                    mode,
                    calendar,
                )?,
                TimeUnit::Microsecond => timestamp::<TimestampMicrosecondType>(
                    data_type,
                    capacity,
                    column_index,
                    mode,
                    calendar,
                )?,
                TimeUnit::Nanosecond => timestamp::<TimestampNanosecondType>(
                    data_type,
                    capacity,
                    column_index,
                    mode,
                    calendar,
                )?,
            }
        }
        DataType::List(element_field) => {
            let element = create_consumer(element_field, ARRAY_VALUE_COLUMN, config)?;
            let vector = ListColumn::try_new(data_type.clone(), capacity)?;
            boxed_consumer(vector, ListCodec::new(element), column_index, mode)
        }
        DataType::Struct(fields) => {
            let children = fields
                .iter()
                .enumerate()
                .map(|(ordinal, child)| create_consumer(child, ordinal, config))
                .collect::<Result<Vec<_>>>()?;
            let vector = StructColumn::try_new(data_type.clone(), capacity)?;
            boxed_consumer(vector, StructCodec::new(children), column_index, mode)
        }
        other => {
            return Err(ConsumerError::Configuration(format!(
                "column {} ('{}') has unsupported type {:?}",
                column_index,
                field.name(),
                other
            )))
        }
    };
    Ok(consumer)
}

/// One consumer per schema field; field `i` reads source ordinal `i`.
pub fn create_consumers(schema: &Schema, config: &ConsumerConfig) -> Result<Vec<Box<dyn ColumnConsumer>>> {
    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(column_index, field)| create_consumer(field, column_index, config))
        .collect()
}

fn primitive<T: ReadPrimitive>(capacity: usize, column_index: usize, mode: NullMode) -> Box<dyn ColumnConsumer> {
    boxed_consumer(
        PrimitiveColumn::<T>::with_capacity(capacity),
        PrimitiveCodec::<T>::default(),
        column_index,
        mode,
    )
}

fn date<T: DateEncoding>(capacity: usize, column_index: usize, mode: NullMode) -> Box<dyn ColumnConsumer> {
    boxed_consumer(
        PrimitiveColumn::<T>::with_capacity(capacity),
        DateCodec::<T>::default(),
        column_index,
        mode,
    )
}

fn time<T: TimeEncoding>(capacity: usize, column_index: usize, mode: NullMode) -> Box<dyn ColumnConsumer> {
    boxed_consumer(
        PrimitiveColumn::<T>::with_capacity(capacity),
        TimeCodec::<T>::default(),
        column_index,
        mode,
    )
}

fn timestamp<T: ArrowTimestampType>(
    data_type: &DataType,
    capacity: usize,
    column_index: usize,
    mode: NullMode,
    calendar: Option<FixedOffset>,
) -> Result<Box<dyn ColumnConsumer>> {
    let vector = PrimitiveColumn::<T>::try_with_data_type(data_type.clone(), capacity)?;
    Ok(boxed_consumer(vector, TimestampCodec::<T>::new(calendar), column_index, mode))
}
