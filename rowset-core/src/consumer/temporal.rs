//! Dates, times of day and timestamps.
//!
//! Timestamps are read as absolute instants. A calendar offset given at
//! construction is passed to the source on every read, so the same stored
//! wall-clock value lands on different instants under different offsets.

use std::marker::PhantomData;

use arrow_array::types::{
    ArrowPrimitiveType, ArrowTimestampType, Date32Type, Date64Type, Time32MillisecondType,
    Time64MicrosecondType, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType,
};
use arrow_array::ArrayRef;
use arrow_interop::PrimitiveColumn;
use arrow_schema::TimeUnit;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};

use super::{boxed_consumer, ColumnConsumer, Consumer, NullMode, Slot, ValueCodec};
use crate::error::{ConsumerError, Result, SourceError};
use crate::row_source::RowSource;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const MILLIS_PER_DAY: i64 = 86_400_000;

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn nanos_since_midnight(time: NaiveTime) -> i64 {
    // Leap seconds carry nanosecond() >= 1e9; they fold into the next second.
    time.num_seconds_from_midnight() as i64 * 1_000_000_000 + time.nanosecond() as i64
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

pub trait DateEncoding: ArrowPrimitiveType {
    fn encode(date: NaiveDate) -> Self::Native;
}

impl DateEncoding for Date32Type {
    fn encode(date: NaiveDate) -> i32 {
        days_since_epoch(date)
    }
}

impl DateEncoding for Date64Type {
    fn encode(date: NaiveDate) -> i64 {
        days_since_epoch(date) as i64 * MILLIS_PER_DAY
    }
}

#[derive(Debug)]
pub struct DateCodec<T>(PhantomData<fn() -> T>);

impl<T> Default for DateCodec<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: DateEncoding> ValueCodec for DateCodec<T> {
    type Buffer = PrimitiveColumn<T>;
    type Value<'s> = NaiveDate;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<NaiveDate, SourceError> {
        source.get_date(column)
    }

    fn write(&mut self, buffer: &mut PrimitiveColumn<T>, slot: Slot, value: NaiveDate) -> Result<()> {
        buffer.set_safe(slot.index, T::encode(value));
        Ok(())
    }

    fn finish(&mut self, buffer: &mut PrimitiveColumn<T>) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

// ---------------------------------------------------------------------------
// Times of day
// ---------------------------------------------------------------------------

pub trait TimeEncoding: ArrowPrimitiveType {
    fn encode(time: NaiveTime) -> Self::Native;
}

impl TimeEncoding for Time32MillisecondType {
    fn encode(time: NaiveTime) -> i32 {
        (nanos_since_midnight(time) / 1_000_000) as i32
    }
}

impl TimeEncoding for Time64MicrosecondType {
    fn encode(time: NaiveTime) -> i64 {
        nanos_since_midnight(time) / 1_000
    }
}

#[derive(Debug)]
pub struct TimeCodec<T>(PhantomData<fn() -> T>);

impl<T> Default for TimeCodec<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: TimeEncoding> ValueCodec for TimeCodec<T> {
    type Buffer = PrimitiveColumn<T>;
    type Value<'s> = NaiveTime;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<NaiveTime, SourceError> {
        source.get_time(column)
    }

    fn write(&mut self, buffer: &mut PrimitiveColumn<T>, slot: Slot, value: NaiveTime) -> Result<()> {
        buffer.set_safe(slot.index, T::encode(value));
        Ok(())
    }

    fn finish(&mut self, buffer: &mut PrimitiveColumn<T>) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TimestampCodec<T> {
    calendar: Option<FixedOffset>,
    _unit: PhantomData<fn() -> T>,
}

impl<T> TimestampCodec<T> {
    pub fn new(calendar: Option<FixedOffset>) -> Self {
        Self {
            calendar,
            _unit: PhantomData,
        }
    }
}

/// Signed count of `unit` since the Unix epoch.
fn encode_instant(instant: DateTime<Utc>, unit: TimeUnit) -> Option<i64> {
    match unit {
        TimeUnit::Second => Some(instant.timestamp()),
        TimeUnit::Millisecond => Some(instant.timestamp_millis()),
        TimeUnit::Microsecond => Some(instant.timestamp_micros()),
        TimeUnit::Nanosecond => instant.timestamp_nanos_opt(),
    }
}

impl<T: ArrowTimestampType> ValueCodec for TimestampCodec<T> {
    type Buffer = PrimitiveColumn<T>;
    type Value<'s> = DateTime<Utc>;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<DateTime<Utc>, SourceError> {
        source.get_timestamp(column, self.calendar.as_ref())
    }

    fn write(&mut self, buffer: &mut PrimitiveColumn<T>, slot: Slot, value: DateTime<Utc>) -> Result<()> {
        let encoded = encode_instant(value, T::UNIT).ok_or_else(|| ConsumerError::Conversion {
            column: slot.column,
            reason: format!("timestamp {} does not fit in {:?} precision", value, T::UNIT),
        })?;
        buffer.set_safe(slot.index, encoded);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut PrimitiveColumn<T>) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

pub type DateDayConsumer<N> = Consumer<DateCodec<Date32Type>, N>;
pub type DateMilliConsumer<N> = Consumer<DateCodec<Date64Type>, N>;
pub type TimeMilliConsumer<N> = Consumer<TimeCodec<Time32MillisecondType>, N>;
pub type TimeMicroConsumer<N> = Consumer<TimeCodec<Time64MicrosecondType>, N>;
pub type TimestampSecondConsumer<N> = Consumer<TimestampCodec<TimestampSecondType>, N>;
pub type TimestampConsumer<N> = Consumer<TimestampCodec<TimestampMillisecondType>, N>;
pub type TimestampMicroConsumer<N> = Consumer<TimestampCodec<TimestampMicrosecondType>, N>;
pub type TimestampNanoConsumer<N> = Consumer<TimestampCodec<TimestampNanosecondType>, N>;

pub fn create_date_consumer<T: DateEncoding>(
    vector: PrimitiveColumn<T>,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(vector, DateCodec::<T>::default(), column_index, NullMode::from_nullable(nullable))
}

pub fn create_time_consumer<T: TimeEncoding>(
    vector: PrimitiveColumn<T>,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(vector, TimeCodec::<T>::default(), column_index, NullMode::from_nullable(nullable))
}

/// Timestamp consumer. With a `calendar` the source interprets stored
/// wall-clock values in that offset.
pub fn create_timestamp_consumer<T: ArrowTimestampType>(
    vector: PrimitiveColumn<T>,
    column_index: usize,
    nullable: bool,
    calendar: Option<FixedOffset>,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(
        vector,
        TimestampCodec::<T>::new(calendar),
        column_index,
        NullMode::from_nullable(nullable),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::Nullable;
    use crate::memory::{MemoryRowSource, Value};
    use arrow_array::cast::AsArray;
    use arrow_array::Array;
    use chrono::NaiveDateTime;

    fn wall_clock(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    fn consume_all(consumer: &mut dyn ColumnConsumer, values: Vec<Value>) -> ArrayRef {
        let mut source = MemoryRowSource::single_column(values);
        while source.advance().unwrap() {
            consumer.consume(&source).unwrap();
        }
        consumer.finish_batch().unwrap()
    }

    #[test]
    fn dates_count_days_and_millis() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        let mut days = create_date_consumer(PrimitiveColumn::<Date32Type>::with_capacity(1), 0, true);
        let array = consume_all(days.as_mut(), vec![date.into()]);
        assert_eq!(array.as_primitive::<Date32Type>().value(0), 10);

        let before = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        let mut millis = create_date_consumer(PrimitiveColumn::<Date64Type>::with_capacity(2), 0, true);
        let array = consume_all(millis.as_mut(), vec![date.into(), before.into()]);
        let values = array.as_primitive::<Date64Type>();
        assert_eq!(values.value(0), 10 * MILLIS_PER_DAY);
        assert_eq!(values.value(1), -MILLIS_PER_DAY);
    }

    #[test]
    fn times_since_midnight() {
        let time = NaiveTime::from_hms_micro_opt(1, 2, 3, 456_789).unwrap();
        let mut millis =
            create_time_consumer(PrimitiveColumn::<Time32MillisecondType>::with_capacity(1), 0, true);
        let array = consume_all(millis.as_mut(), vec![time.into()]);
        assert_eq!(array.as_primitive::<Time32MillisecondType>().value(0), 3_723_456);

        let mut micros =
            create_time_consumer(PrimitiveColumn::<Time64MicrosecondType>::with_capacity(1), 0, true);
        let array = consume_all(micros.as_mut(), vec![time.into()]);
        assert_eq!(array.as_primitive::<Time64MicrosecondType>().value(0), 3_723_456_789);
    }

    #[test]
    fn timestamp_with_calendar_offset() {
        let wall = wall_clock("2024-06-01 12:00:00.250");
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let mut utc = TimestampConsumer::<Nullable>::new(
            PrimitiveColumn::with_capacity(1),
            TimestampCodec::new(None),
            0,
        );
        let mut shifted = TimestampConsumer::<Nullable>::new(
            PrimitiveColumn::with_capacity(1),
            TimestampCodec::new(Some(plus_two)),
            0,
        );
        let utc = consume_all(&mut utc, vec![wall.into()]);
        let shifted = consume_all(&mut shifted, vec![wall.into()]);

        let utc = utc.as_primitive::<TimestampMillisecondType>().value(0);
        let shifted = shifted.as_primitive::<TimestampMillisecondType>().value(0);
        assert_eq!(utc, wall.and_utc().timestamp_millis());
        assert_eq!(utc - shifted, 2 * 3_600_000);

        let back = DateTime::from_timestamp_millis(shifted)
            .unwrap()
            .with_timezone(&plus_two)
            .naive_local();
        assert_eq!(back, wall);
    }

    #[test]
    fn timestamp_units() {
        let wall = wall_clock("1970-01-01 00:00:01.5");
        let mut seconds = create_timestamp_consumer(
            PrimitiveColumn::<TimestampSecondType>::with_capacity(1),
            0,
            true,
            None,
        );
        let mut nanos = create_timestamp_consumer(
            PrimitiveColumn::<TimestampNanosecondType>::with_capacity(1),
            0,
            true,
            None,
        );
        let s = consume_all(seconds.as_mut(), vec![wall.into()]);
        let ns = consume_all(nanos.as_mut(), vec![wall.into()]);
        assert_eq!(s.as_primitive::<TimestampSecondType>().value(0), 1);
        assert_eq!(ns.as_primitive::<TimestampNanosecondType>().value(0), 1_500_000_000);
    }

    #[test]
    fn nanosecond_overflow_is_a_conversion_error() {
        let far = wall_clock("2500-01-01 00:00:00.0");
        let mut nanos = create_timestamp_consumer(
            PrimitiveColumn::<TimestampNanosecondType>::with_capacity(1),
            0,
            true,
            None,
        );
        let mut source = MemoryRowSource::single_column([Value::Timestamp(far)]);
        source.advance().unwrap();
        let err = nanos.consume(&source).unwrap_err();
        assert!(matches!(err, ConsumerError::Conversion { column: 0, .. }));
    }

    #[test]
    fn null_timestamp_is_null() {
        let mut consumer = create_timestamp_consumer(
            PrimitiveColumn::<TimestampMillisecondType>::with_capacity(2),
            0,
            true,
            Some(FixedOffset::east_opt(3600).unwrap()),
        );
        let array = consume_all(consumer.as_mut(), vec![Value::Null, wall_clock("2000-01-01 00:00:00.0").into()]);
        assert!(array.is_null(0));
        assert!(array.is_valid(1));
    }
}
