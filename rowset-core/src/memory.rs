//! Row source over rows held in memory.
//!
//! Used by the tests, the benches and the demo, and useful wherever rows are
//! already materialised (a cached result set, a fixture).

use std::cell::Cell;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::SourceError;
use crate::row_source::RowSource;

/// One cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Wall-clock timestamp without a zone. Interpreted in the calendar the
    /// reader supplies, UTC otherwise.
    Timestamp(NaiveDateTime),
    Array(Vec<Value>),
    /// Attribute values in field order.
    Struct(Vec<Value>),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Decimal(_) => "Decimal",
            Value::Text(_) => "Text",
            Value::Bytes(_) => "Bytes",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::Timestamp(_) => "Timestamp",
            Value::Array(_) => "Array",
            Value::Struct(_) => "Struct",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Decimal,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Forward-only cursor over `Vec<Vec<Value>>`.
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    rows: Vec<Vec<Value>>,
    column_count: usize,
    /// `None` before the first `advance`.
    position: Option<usize>,
    was_null: Cell<bool>,
    failure: Option<(usize, usize)>,
}

impl MemoryRowSource {
    pub fn new(column_count: usize, rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            column_count,
            position: None,
            was_null: Cell::new(false),
            failure: None,
        }
    }

    /// Column count taken from the first row.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        let column_count = rows.first().map_or(0, Vec::len);
        Self::new(column_count, rows)
    }

    /// Single-column source, one row per value.
    pub fn single_column(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(1, values.into_iter().map(|v| vec![v]).collect())
    }

    /// Source already positioned on its only row.
    pub fn positioned(row: Vec<Value>) -> Self {
        let mut source = Self::new(row.len(), vec![row]);
        source.position = Some(0);
        source
    }

    /// Array elements as `(index, value)` rows.
    pub fn array_elements(values: Vec<Value>) -> Self {
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| vec![Value::Int(i as i64 + 1), v])
            .collect();
        Self::new(2, rows)
    }

    /// Make every read of `column` on row `row` fail with a driver error.
    pub fn with_failure(mut self, row: usize, column: usize) -> Self {
        self.failure = Some((row, column));
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, column: usize) -> Result<&Value, SourceError> {
        let row = self
            .position
            .filter(|&p| p < self.rows.len())
            .ok_or(SourceError::NoCurrentRow)?;
        if self.failure == Some((row, column)) {
            return Err(SourceError::Driver(format!(
                "read failed at row {}, column {}",
                row, column
            )));
        }
        let value = self.rows[row]
            .get(column)
            .ok_or(SourceError::ColumnOutOfRange {
                column,
                count: self.column_count,
            })?;
        self.was_null.set(matches!(value, Value::Null));
        Ok(value)
    }

    fn integer(&self, column: usize, target: &'static str) -> Result<i64, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(0),
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(column, target, other)),
        }
    }

    fn narrow<T: TryFrom<i64>>(&self, column: usize, target: &'static str) -> Result<T, SourceError> {
        let v = self.integer(column, target)?;
        T::try_from(v).map_err(|_| SourceError::OutOfRange { column, target })
    }

    fn float(&self, column: usize, target: &'static str) -> Result<f64, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(0.0),
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch(column, target, other)),
        }
    }
}

fn mismatch(column: usize, expected: &'static str, found: &Value) -> SourceError {
    SourceError::TypeMismatch {
        column,
        expected,
        found: found.kind().to_string(),
    }
}

impl RowSource for MemoryRowSource {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn advance(&mut self) -> Result<bool, SourceError> {
        let next = self.position.map_or(0, |p| (p + 1).min(self.rows.len()));
        self.position = Some(next);
        self.was_null.set(false);
        Ok(next < self.rows.len())
    }

    fn was_null(&self) -> bool {
        self.was_null.get()
    }

    fn get_bool(&self, column: usize) -> Result<bool, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(false),
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            other => Err(mismatch(column, "Boolean", other)),
        }
    }

    fn get_i8(&self, column: usize) -> Result<i8, SourceError> {
        self.narrow(column, "Int8")
    }

    fn get_i16(&self, column: usize) -> Result<i16, SourceError> {
        self.narrow(column, "Int16")
    }

    fn get_i32(&self, column: usize) -> Result<i32, SourceError> {
        self.narrow(column, "Int32")
    }

    fn get_i64(&self, column: usize) -> Result<i64, SourceError> {
        self.integer(column, "Int64")
    }

    fn get_f32(&self, column: usize) -> Result<f32, SourceError> {
        self.float(column, "Float32").map(|v| v as f32)
    }

    fn get_f64(&self, column: usize) -> Result<f64, SourceError> {
        self.float(column, "Float64")
    }

    fn get_decimal(&self, column: usize) -> Result<Decimal, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(Decimal::ZERO),
            Value::Decimal(v) => Ok(*v),
            Value::Int(v) => Ok(Decimal::from(*v)),
            other => Err(mismatch(column, "Decimal", other)),
        }
    }

    fn get_str(&self, column: usize) -> Result<&str, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(""),
            Value::Text(v) => Ok(v),
            other => Err(mismatch(column, "Text", other)),
        }
    }

    fn get_bytes(&self, column: usize) -> Result<&[u8], SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(&[]),
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.as_bytes()),
            other => Err(mismatch(column, "Bytes", other)),
        }
    }

    fn get_date(&self, column: usize) -> Result<NaiveDate, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(NaiveDate::default()),
            Value::Date(v) => Ok(*v),
            Value::Timestamp(v) => Ok(v.date()),
            other => Err(mismatch(column, "Date", other)),
        }
    }

    fn get_time(&self, column: usize) -> Result<NaiveTime, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(NaiveTime::default()),
            Value::Time(v) => Ok(*v),
            Value::Timestamp(v) => Ok(v.time()),
            other => Err(mismatch(column, "Time", other)),
        }
    }

    fn get_timestamp(
        &self,
        column: usize,
        calendar: Option<&FixedOffset>,
    ) -> Result<DateTime<Utc>, SourceError> {
        let wall_clock = match self.cell(column)? {
            Value::Null => return Ok(NaiveDateTime::default().and_utc()),
            Value::Timestamp(v) => *v,
            Value::Date(v) => v.and_time(NaiveTime::default()),
            other => return Err(mismatch(column, "Timestamp", other)),
        };
        match calendar {
            None => Ok(wall_clock.and_utc()),
            Some(offset) => wall_clock
                .and_local_timezone(*offset)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or(SourceError::OutOfRange {
                    column,
                    target: "Timestamp",
                }),
        }
    }

    fn get_array(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(Box::new(MemoryRowSource::array_elements(Vec::new()))),
            Value::Array(values) => Ok(Box::new(MemoryRowSource::array_elements(values.clone()))),
            other => Err(mismatch(column, "Array", other)),
        }
    }

    fn get_struct(&self, column: usize) -> Result<Box<dyn RowSource + '_>, SourceError> {
        match self.cell(column)? {
            Value::Null => Ok(Box::new(MemoryRowSource::new(0, Vec::new()))),
            Value::Struct(values) => Ok(Box::new(MemoryRowSource::positioned(values.clone()))),
            other => Err(mismatch(column, "Struct", other)),
        }
    }
}
