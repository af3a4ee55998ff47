//! The forward-only cursor consumers read from.
//!
//! Reads follow the SQL cursor convention: a typed getter returns a
//! placeholder (zero, empty, epoch) for SQL NULL, and [`RowSource::was_null`]
//! reports whether the value just read was NULL. Column ordinals are 0-based.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::SourceError;

/// Ordinal of the element value in the rows of an array source.
///
/// Array values are exposed as a nested source whose rows are
/// `(index, value)` pairs.
pub const ARRAY_VALUE_COLUMN: usize = 1;

pub trait RowSource {
    /// Number of columns in every row.
    fn column_count(&self) -> usize;

    /// Move to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, SourceError>;

    /// Whether the most recent read on the current row was SQL NULL.
    fn was_null(&self) -> bool;

    fn get_bool(&self, column: usize) -> Result<bool, SourceError>;
    fn get_i8(&self, column: usize) -> Result<i8, SourceError>;
    fn get_i16(&self, column: usize) -> Result<i16, SourceError>;
    fn get_i32(&self, column: usize) -> Result<i32, SourceError>;
    fn get_i64(&self, column: usize) -> Result<i64, SourceError>;
    fn get_f32(&self, column: usize) -> Result<f32, SourceError>;
    fn get_f64(&self, column: usize) -> Result<f64, SourceError>;
    fn get_decimal(&self, column: usize) -> Result<Decimal, SourceError>;
    fn get_str(&self, column: usize) -> Result<&str, SourceError>;
    fn get_bytes(&self, column: usize) -> Result<&[u8], SourceError>;
    fn get_date(&self, column: usize) -> Result<NaiveDate, SourceError>;
    fn get_time(&self, column: usize) -> Result<NaiveTime, SourceError>;

    /// Read a timestamp as an absolute instant.
    ///
    /// The stored wall-clock value is interpreted in `calendar` when one is
    /// given, otherwise in the source's own zone. The same stored value read
    /// under different calendars yields different instants.
    fn get_timestamp(
        &self,
        column: usize,
        calendar: Option<&FixedOffset>,
    ) -> Result<DateTime<Utc>, SourceError>;

    /// Elements of an array value, as a nested source of `(index, value)`
    /// rows. A NULL array yields an empty source.
    fn get_array(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError>;

    /// Attributes of a composite value, as a nested source already positioned
    /// on its single row. A NULL value yields an empty source.
    fn get_struct(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError>;
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn column_count(&self) -> usize {
        (**self).column_count()
    }

    fn advance(&mut self) -> Result<bool, SourceError> {
        (**self).advance()
    }

    fn was_null(&self) -> bool {
        (**self).was_null()
    }

    fn get_bool(&self, column: usize) -> Result<bool, SourceError> {
        (**self).get_bool(column)
    }

    fn get_i8(&self, column: usize) -> Result<i8, SourceError> {
        (**self).get_i8(column)
    }

    fn get_i16(&self, column: usize) -> Result<i16, SourceError> {
        (**self).get_i16(column)
    }

    fn get_i32(&self, column: usize) -> Result<i32, SourceError> {
        (**self).get_i32(column)
    }

    fn get_i64(&self, column: usize) -> Result<i64, SourceError> {
        (**self).get_i64(column)
    }

    fn get_f32(&self, column: usize) -> Result<f32, SourceError> {
        (**self).get_f32(column)
    }

    fn get_f64(&self, column: usize) -> Result<f64, SourceError> {
        (**self).get_f64(column)
    }

    fn get_decimal(&self, column: usize) -> Result<Decimal, SourceError> {
        (**self).get_decimal(column)
    }

    fn get_str(&self, column: usize) -> Result<&str, SourceError> {
        (**self).get_str(column)
    }

    fn get_bytes(&self, column: usize) -> Result<&[u8], SourceError> {
        (**self).get_bytes(column)
    }

    fn get_date(&self, column: usize) -> Result<NaiveDate, SourceError> {
        (**self).get_date(column)
    }

    fn get_time(&self, column: usize) -> Result<NaiveTime, SourceError> {
        (**self).get_time(column)
    }

    fn get_timestamp(
        &self,
        column: usize,
        calendar: Option<&FixedOffset>,
    ) -> Result<DateTime<Utc>, SourceError> {
        (**self).get_timestamp(column, calendar)
    }

    fn get_array(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError> {
        (**self).get_array(column)
    }

    fn get_struct(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError> {
        (**self).get_struct(column)
    }
}
