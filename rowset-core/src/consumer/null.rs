use arrow_array::ArrayRef;
use arrow_interop::NullColumn;

use super::{Consumer, Slot, ValueCodec};
use crate::error::{Result, SourceError};
use crate::row_source::RowSource;

/// Columns of the `Null` type. Nothing is read from the source; the buffer
/// only tracks how many rows went by.
#[derive(Debug, Default)]
pub struct NullCodec;

impl ValueCodec for NullCodec {
    type Buffer = NullColumn;
    type Value<'s> = ();

    fn read<'s>(&self, _source: &'s dyn RowSource, _column: usize) -> Result<(), SourceError> {
        Ok(())
    }

    fn write(&mut self, _buffer: &mut NullColumn, _slot: Slot, _value: ()) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, buffer: &mut NullColumn) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

/// `was_null` is never consulted since nothing is read.
pub type NullConsumer = Consumer<NullCodec, super::NonNullable>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::ColumnConsumer;
    use crate::memory::{MemoryRowSource, Value};
    use arrow_array::Array;

    #[test]
    fn counts_rows() {
        let mut consumer = NullConsumer::new(NullColumn::new(), NullCodec, 0);
        let mut source = MemoryRowSource::single_column([Value::Int(1), Value::Null]);
        while source.advance().unwrap() {
            consumer.consume(&source).unwrap();
        }
        let array = consumer.finish_batch().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.data_type(), &arrow_schema::DataType::Null);
    }
}
