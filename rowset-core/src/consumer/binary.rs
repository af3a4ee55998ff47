//! Variable-width strings and byte arrays.

use arrow_array::ArrayRef;
use arrow_interop::{BinaryColumn, Utf8Column};

use super::{boxed_consumer, ColumnConsumer, Consumer, NullMode, Slot, ValueCodec};
use crate::error::{Result, SourceError};
use crate::row_source::RowSource;

#[derive(Debug, Default)]
pub struct Utf8Codec;

impl ValueCodec for Utf8Codec {
    type Buffer = Utf8Column;
    type Value<'s> = &'s str;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<&'s str, SourceError> {
        source.get_str(column)
    }

    fn write(&mut self, buffer: &mut Utf8Column, slot: Slot, value: &str) -> Result<()> {
        buffer.set_safe(slot.index, value);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut Utf8Column) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

#[derive(Debug, Default)]
pub struct BinaryCodec;

impl ValueCodec for BinaryCodec {
    type Buffer = BinaryColumn;
    type Value<'s> = &'s [u8];

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<&'s [u8], SourceError> {
        source.get_bytes(column)
    }

    fn write(&mut self, buffer: &mut BinaryColumn, slot: Slot, value: &[u8]) -> Result<()> {
        buffer.set_safe(slot.index, value);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut BinaryColumn) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

pub type VarCharConsumer<N> = Consumer<Utf8Codec, N>;
pub type BinaryConsumer<N> = Consumer<BinaryCodec, N>;

pub fn create_varchar_consumer(
    vector: Utf8Column,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(vector, Utf8Codec, column_index, NullMode::from_nullable(nullable))
}

pub fn create_binary_consumer(
    vector: BinaryColumn,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(vector, BinaryCodec, column_index, NullMode::from_nullable(nullable))
}
