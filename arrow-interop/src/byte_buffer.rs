//! Variable-width column buffers (UTF-8 strings and opaque binary).

use std::any::Any;
use std::sync::Arc;

use arrow_array::builder::{ArrayBuilder, GenericByteBuilder};
use arrow_array::types::{BinaryType, ByteArrayType, Utf8Type};
use arrow_array::ArrayRef;
use arrow_schema::DataType;

use crate::column_buffer::{pad_to, ColumnBuffer};

/// Average bytes reserved per slot when a capacity hint is given.
const BYTES_PER_VALUE_HINT: usize = 16;

pub struct ByteColumn<T: ByteArrayType> {
    builder: GenericByteBuilder<T>,
    data_type: DataType,
}

pub type Utf8Column = ByteColumn<Utf8Type>;
pub type BinaryColumn = ByteColumn<BinaryType>;

impl<T: ByteArrayType> ByteColumn<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            builder: GenericByteBuilder::with_capacity(capacity, capacity * BYTES_PER_VALUE_HINT),
            data_type: T::DATA_TYPE,
        }
    }

    pub fn set_safe(&mut self, index: usize, value: impl AsRef<T::Native>) {
        pad_to(&mut self.builder, index, append_nulls);
        self.builder.append_value(value);
    }

    pub fn finish(&mut self) -> ArrayRef {
        Arc::new(self.builder.finish())
    }
}

impl<T: ByteArrayType> std::fmt::Debug for ByteColumn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteColumn")
            .field("data_type", &self.data_type)
            .field("len", &self.builder.len())
            .finish()
    }
}

fn append_nulls<T: ByteArrayType>(builder: &mut GenericByteBuilder<T>, n: usize) {
    for _ in 0..n {
        builder.append_null();
    }
}

impl<T: ByteArrayType> ColumnBuffer for ByteColumn<T> {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn len(&self) -> usize {
        self.builder.len()
    }

    fn set_value_count(&mut self, count: usize) {
        pad_to(&mut self.builder, count, append_nulls);
    }

    fn clear(&mut self) {
        if !self.is_empty() {
            self.builder.finish();
        }
    }

    fn release(&mut self) {
        self.builder = GenericByteBuilder::new();
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;
    use arrow_array::Array;

    #[test]
    fn strings_with_gaps() {
        let mut col = Utf8Column::with_capacity(4);
        col.set_safe(0, "a");
        col.set_safe(2, "ccc");
        col.set_value_count(4);

        let array = col.finish();
        let strings = array.as_string::<i32>();
        assert_eq!(strings.len(), 4);
        assert_eq!(strings.value(0), "a");
        assert!(strings.is_null(1));
        assert_eq!(strings.value(2), "ccc");
        assert!(strings.is_null(3));
    }

    #[test]
    fn binary_round_trips_bytes() {
        let mut col = BinaryColumn::with_capacity(1);
        col.set_safe(0, [0xde_u8, 0xad]);
        let array = col.finish();
        assert_eq!(array.as_binary::<i32>().value(0), &[0xde, 0xad]);
        assert_eq!(col.data_type(), &DataType::Binary);
    }

    #[test]
    fn clear_then_write_from_zero() {
        let mut col = Utf8Column::with_capacity(2);
        col.set_safe(0, "stale");
        col.clear();
        col.set_safe(0, "fresh");
        let array = col.finish();
        assert_eq!(array.len(), 1);
        assert_eq!(array.as_string::<i32>().value(0), "fresh");
    }
}
