//! Owned, growable, null-aware column buffers with safe-append semantics.
//!
//! A buffer receives writes at monotonically increasing positions. Any
//! position skipped by the writer becomes a null slot the next time the
//! buffer is written to or sized with [`ColumnBuffer::set_value_count`].

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{bail, Result};
use arrow_array::builder::{ArrayBuilder, BooleanBuilder, NullBuilder, PrimitiveBuilder};
use arrow_array::types::ArrowPrimitiveType;
use arrow_array::{ArrayRef, PrimitiveArray};
use arrow_schema::DataType;

/// Storage for one column of the batch currently being filled.
pub trait ColumnBuffer: Debug + Send + 'static {
    /// Arrow type of the array this buffer finishes into.
    fn data_type(&self) -> &DataType;

    /// Number of slots written or padded so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pad with trailing nulls until the buffer holds exactly `count` slots.
    fn set_value_count(&mut self, count: usize);

    /// Discard every written slot so the next write lands at position 0.
    fn clear(&mut self);

    /// Drop the backing storage. The buffer stays usable but starts from
    /// zero capacity.
    fn release(&mut self);

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Fixed-width values of an Arrow primitive type (integers, floats,
/// temporal and decimal types).
pub struct PrimitiveColumn<T: ArrowPrimitiveType> {
    builder: PrimitiveBuilder<T>,
    data_type: DataType,
}

impl<T: ArrowPrimitiveType> PrimitiveColumn<T> {
    /// Buffer for the type's default `DataType`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            builder: PrimitiveBuilder::with_capacity(capacity),
            data_type: T::DATA_TYPE,
        }
    }

    /// Buffer for a parameterised `DataType` (timestamp zone, decimal
    /// precision and scale).
    pub fn try_with_data_type(data_type: DataType, capacity: usize) -> Result<Self> {
        if !PrimitiveArray::<T>::is_compatible(&data_type) {
            bail!(
                "DataType {:?} is not compatible with {:?} buffers",
                data_type,
                T::DATA_TYPE
            );
        }
        Ok(Self {
            builder: PrimitiveBuilder::with_capacity(capacity).with_data_type(data_type.clone()),
            data_type,
        })
    }

    /// Write `value` at `index`, padding any skipped positions with nulls.
    pub fn set_safe(&mut self, index: usize, value: T::Native) {
        pad_to(&mut self.builder, index, |b, n| b.append_nulls(n));
        self.builder.append_value(value);
    }

    /// Move the buffered values out as an array. The buffer is left empty.
    pub fn finish(&mut self) -> ArrayRef {
        Arc::new(self.builder.finish())
    }
}

impl<T: ArrowPrimitiveType> Debug for PrimitiveColumn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveColumn")
            .field("data_type", &self.data_type)
            .field("len", &self.builder.len())
            .finish()
    }
}

impl<T: ArrowPrimitiveType> ColumnBuffer for PrimitiveColumn<T> {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn len(&self) -> usize {
        self.builder.len()
    }

    fn set_value_count(&mut self, count: usize) {
        pad_to(&mut self.builder, count, |b, n| b.append_nulls(n));
    }

    fn clear(&mut self) {
        if !self.is_empty() {
            self.builder.finish();
        }
    }

    fn release(&mut self) {
        self.builder = PrimitiveBuilder::new().with_data_type(self.data_type.clone());
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Bit-packed booleans.
#[derive(Debug)]
pub struct BooleanColumn {
    builder: BooleanBuilder,
}

impl BooleanColumn {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            builder: BooleanBuilder::with_capacity(capacity),
        }
    }

    pub fn set_safe(&mut self, index: usize, value: bool) {
        pad_to(&mut self.builder, index, |b, n| b.append_nulls(n));
        self.builder.append_value(value);
    }

    pub fn finish(&mut self) -> ArrayRef {
        Arc::new(self.builder.finish())
    }
}

impl ColumnBuffer for BooleanColumn {
    fn data_type(&self) -> &DataType {
        &DataType::Boolean
    }

    fn len(&self) -> usize {
        self.builder.len()
    }

    fn set_value_count(&mut self, count: usize) {
        pad_to(&mut self.builder, count, |b, n| b.append_nulls(n));
    }

    fn clear(&mut self) {
        if !self.is_empty() {
            self.builder.finish();
        }
    }

    fn release(&mut self) {
        self.builder = BooleanBuilder::new();
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Column of the `Null` type: every slot is null, only the length matters.
#[derive(Debug)]
pub struct NullColumn {
    builder: NullBuilder,
}

impl NullColumn {
    pub fn new() -> Self {
        Self {
            builder: NullBuilder::new(),
        }
    }

    pub fn finish(&mut self) -> ArrayRef {
        Arc::new(self.builder.finish())
    }
}

impl Default for NullColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnBuffer for NullColumn {
    fn data_type(&self) -> &DataType {
        &DataType::Null
    }

    fn len(&self) -> usize {
        self.builder.len()
    }

    fn set_value_count(&mut self, count: usize) {
        pad_to(&mut self.builder, count, |b, n| b.append_nulls(n));
    }

    fn clear(&mut self) {
        self.builder.finish();
    }

    fn release(&mut self) {
        self.builder = NullBuilder::new();
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Append `index - len` nulls so that the next append lands on `index`.
///
/// Writers only ever move forward; a position behind the current length
/// means a consumer was not reset between batches.
pub(crate) fn pad_to<B: ArrayBuilder>(
    builder: &mut B,
    index: usize,
    append_nulls: impl FnOnce(&mut B, usize),
) {
    let len = builder.len();
    debug_assert!(
        index >= len,
        "column writes must move forward: position {index} is behind length {len}"
    );
    if index > len {
        append_nulls(builder, index - len);
    }
}
