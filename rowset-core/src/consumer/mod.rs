//! Per-column consumers: read one value from the current row and append it
//! to the column's buffer.
//!
//! A [`Consumer`] is generic over two things fixed at construction:
//!
//! * a [`ValueCodec`], which knows how to read one kind of value from a
//!   [`RowSource`] and write it into the matching [`ColumnBuffer`];
//! * a [`Nullability`] marker deciding what happens when the source reports
//!   SQL NULL. The branch is a `const` on the marker and compiles away for
//!   [`NonNullable`].
//!
//! Drivers see consumers through the object-safe [`ColumnConsumer`] trait.

use std::fmt;
use std::marker::PhantomData;

use arrow_array::ArrayRef;
use arrow_interop::ColumnBuffer;
use arrow_schema::DataType;

use crate::error::{ConsumerError, Result, SourceError};
use crate::row_source::RowSource;

pub mod binary;
pub mod composite;
pub mod decimal;
pub mod nested;
pub mod null;
pub mod primitive;
pub mod temporal;

// ---------------------------------------------------------------------------
// Nullability
// ---------------------------------------------------------------------------

pub trait Nullability: Send + 'static {
    /// Consult `was_null` after every read.
    const CHECKS_NULL: bool;
    /// Fail instead of leaving a null slot.
    const REJECTS_NULL: bool;
}

/// NULL leaves a null slot.
#[derive(Debug)]
pub enum Nullable {}

/// `was_null` is never consulted; a NULL stores whatever placeholder the
/// source returned for it.
#[derive(Debug)]
pub enum NonNullable {}

/// NULL fails with [`ConsumerError::UnexpectedNull`].
#[derive(Debug)]
pub enum RejectNull {}

impl Nullability for Nullable {
    const CHECKS_NULL: bool = true;
    const REJECTS_NULL: bool = false;
}

impl Nullability for NonNullable {
    const CHECKS_NULL: bool = false;
    const REJECTS_NULL: bool = false;
}

impl Nullability for RejectNull {
    const CHECKS_NULL: bool = true;
    const REJECTS_NULL: bool = true;
}

/// Runtime selector for the nullability marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullMode {
    Nullable,
    NonNullable,
    Reject,
}

impl NullMode {
    pub fn from_nullable(nullable: bool) -> Self {
        if nullable {
            NullMode::Nullable
        } else {
            NullMode::NonNullable
        }
    }

    /// Mode for a field: declared NOT NULL columns reject NULL only when
    /// `strict` is set.
    pub fn for_field(nullable: bool, strict: bool) -> Self {
        match (nullable, strict) {
            (true, _) => NullMode::Nullable,
            (false, true) => NullMode::Reject,
            (false, false) => NullMode::NonNullable,
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Where a value lands: the source column it came from and its position in
/// the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub column: usize,
    pub index: usize,
}

/// Reads one kind of value from a row source and writes it into a buffer.
pub trait ValueCodec: Send + 'static {
    type Buffer: ColumnBuffer;
    type Value<'s>;

    fn read<'s>(
        &self,
        source: &'s dyn RowSource,
        column: usize,
    ) -> std::result::Result<Self::Value<'s>, SourceError>;

    fn write(&mut self, buffer: &mut Self::Buffer, slot: Slot, value: Self::Value<'_>)
        -> Result<()>;

    /// Called for a NULL in nullable mode. The buffer fills the gap itself.
    fn write_null(&mut self, _buffer: &mut Self::Buffer, _slot: Slot) {}

    /// Move the buffered values out as an array.
    fn finish(&mut self, buffer: &mut Self::Buffer) -> Result<ArrayRef>;

    /// Called whenever the owning consumer's cursor goes back to 0. Codecs
    /// with child consumers restart them here.
    fn reset(&mut self) {}

    fn close(&mut self) {}
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

pub struct Consumer<C: ValueCodec, N: Nullability> {
    vector: C::Buffer,
    codec: C,
    column_index: usize,
    current_index: usize,
    _nullability: PhantomData<N>,
}

impl<C: ValueCodec, N: Nullability> Consumer<C, N> {
    pub fn new(vector: C::Buffer, codec: C, column_index: usize) -> Self {
        Self {
            vector,
            codec,
            column_index,
            current_index: 0,
            _nullability: PhantomData,
        }
    }

    /// Install `vector` as the buffer for the next batch and return the old
    /// one, untouched. Anything `vector` still holds is discarded so that
    /// writing restarts at position 0.
    pub fn swap_vector(&mut self, vector: C::Buffer) -> C::Buffer {
        let old = std::mem::replace(&mut self.vector, vector);
        self.restart();
        old
    }

    fn restart(&mut self) {
        self.vector.clear();
        self.current_index = 0;
        self.codec.reset();
    }

    pub fn vector(&self) -> &C::Buffer {
        &self.vector
    }
}

impl<C: ValueCodec, N: Nullability> fmt::Debug for Consumer<C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("column_index", &self.column_index)
            .field("current_index", &self.current_index)
            .field("data_type", self.vector.data_type())
            .field("nullability", &std::any::type_name::<N>())
            .finish()
    }
}

/// Object-safe view of a consumer, used by drivers and by nested codecs
/// holding child consumers.
pub trait ColumnConsumer: Send {
    /// Read this column from the current row and append it at the cursor.
    fn consume(&mut self, source: &dyn RowSource) -> Result<()>;

    /// Install a new buffer, reset the cursor and return the previous
    /// buffer. Fails when `vector` is not the concrete buffer type this
    /// consumer writes to, or has a different data type.
    fn reset_value_vector(&mut self, vector: Box<dyn ColumnBuffer>) -> Result<Box<dyn ColumnBuffer>>;

    /// Reset the cursor and keep writing into the current buffer, dropping
    /// any values not yet moved out by `finish_batch`.
    fn reuse_vector(&mut self);

    /// Pad the buffer to the cursor and move its contents out.
    fn finish_batch(&mut self) -> Result<ArrayRef>;

    /// Advance the cursor without reading, leaving a null slot.
    fn skip(&mut self);

    /// Release the buffer and any child consumers.
    fn close(&mut self);

    /// Rows written since the last reset.
    fn current_index(&self) -> usize;

    fn column_index(&self) -> usize;

    fn data_type(&self) -> &DataType;
}

impl<C: ValueCodec, N: Nullability> ColumnConsumer for Consumer<C, N> {
    fn consume(&mut self, source: &dyn RowSource) -> Result<()> {
        let value = self.codec.read(source, self.column_index)?;
        let slot = Slot {
            column: self.column_index,
            index: self.current_index,
        };
        if N::CHECKS_NULL && source.was_null() {
            if N::REJECTS_NULL {
                return Err(ConsumerError::UnexpectedNull {
                    column: self.column_index,
                });
            }
            self.codec.write_null(&mut self.vector, slot);
        } else {
            self.codec.write(&mut self.vector, slot, value)?;
        }
        self.current_index += 1;
        Ok(())
    }

    fn reset_value_vector(&mut self, vector: Box<dyn ColumnBuffer>) -> Result<Box<dyn ColumnBuffer>> {
        if vector.data_type() != self.vector.data_type() {
            return Err(ConsumerError::Configuration(format!(
                "column {}: cannot reset a {:?} consumer with a {:?} buffer",
                self.column_index,
                self.vector.data_type(),
                vector.data_type()
            )));
        }
        let vector = vector.into_any().downcast::<C::Buffer>().map_err(|_| {
            ConsumerError::Configuration(format!(
                "column {}: replacement buffer is not a {}",
                self.column_index,
                std::any::type_name::<C::Buffer>()
            ))
        })?;
        Ok(Box::new(self.swap_vector(*vector)))
    }

    fn reuse_vector(&mut self) {
        self.restart();
    }

    fn finish_batch(&mut self) -> Result<ArrayRef> {
        self.vector.set_value_count(self.current_index);
        self.codec.finish(&mut self.vector)
    }

    fn skip(&mut self) {
        let slot = Slot {
            column: self.column_index,
            index: self.current_index,
        };
        self.codec.write_null(&mut self.vector, slot);
        self.current_index += 1;
    }

    fn close(&mut self) {
        self.codec.close();
        self.vector.release();
    }

    fn current_index(&self) -> usize {
        self.current_index
    }

    fn column_index(&self) -> usize {
        self.column_index
    }

    fn data_type(&self) -> &DataType {
        self.vector.data_type()
    }
}

/// Box a consumer with the nullability marker `mode` selects.
pub fn boxed_consumer<C: ValueCodec>(
    vector: C::Buffer,
    codec: C,
    column_index: usize,
    mode: NullMode,
) -> Box<dyn ColumnConsumer> {
    match mode {
        NullMode::Nullable => Box::new(Consumer::<C, Nullable>::new(vector, codec, column_index)),
        NullMode::NonNullable => {
            Box::new(Consumer::<C, NonNullable>::new(vector, codec, column_index))
        }
        NullMode::Reject => Box::new(Consumer::<C, RejectNull>::new(vector, codec, column_index)),
    }
}
