//! Fixed-width integers, floats and booleans.

use std::marker::PhantomData;

use arrow_array::types::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
};
use arrow_array::ArrayRef;
use arrow_interop::{BooleanColumn, PrimitiveColumn};

use super::{boxed_consumer, ColumnConsumer, Consumer, NullMode, Slot, ValueCodec};
use crate::error::{Result, SourceError};
use crate::row_source::RowSource;

/// Arrow primitive types with a direct row source getter.
pub trait ReadPrimitive: ArrowPrimitiveType {
    fn read(source: &dyn RowSource, column: usize) -> Result<Self::Native, SourceError>;
}

macro_rules! read_primitive {
    ($($arrow:ty => $getter:ident),* $(,)?) => {
        $(
            impl ReadPrimitive for $arrow {
                fn read(source: &dyn RowSource, column: usize) -> Result<Self::Native, SourceError> {
                    source.$getter(column)
                }
            }
        )*
    };
}

read_primitive! {
    Int8Type => get_i8,
    Int16Type => get_i16,
    Int32Type => get_i32,
    Int64Type => get_i64,
    Float32Type => get_f32,
    Float64Type => get_f64,
}

/// Stores the value exactly as the source returned it.
#[derive(Debug)]
pub struct PrimitiveCodec<T>(PhantomData<fn() -> T>);

impl<T> Default for PrimitiveCodec<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: ReadPrimitive> ValueCodec for PrimitiveCodec<T> {
    type Buffer = PrimitiveColumn<T>;
    type Value<'s> = T::Native;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<T::Native, SourceError> {
        T::read(source, column)
    }

    fn write(&mut self, buffer: &mut PrimitiveColumn<T>, slot: Slot, value: T::Native) -> Result<()> {
        buffer.set_safe(slot.index, value);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut PrimitiveColumn<T>) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

#[derive(Debug, Default)]
pub struct BooleanCodec;

impl ValueCodec for BooleanCodec {
    type Buffer = BooleanColumn;
    type Value<'s> = bool;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<bool, SourceError> {
        source.get_bool(column)
    }

    fn write(&mut self, buffer: &mut BooleanColumn, slot: Slot, value: bool) -> Result<()> {
        buffer.set_safe(slot.index, value);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut BooleanColumn) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

pub type BitConsumer<N> = Consumer<BooleanCodec, N>;
pub type TinyIntConsumer<N> = Consumer<PrimitiveCodec<Int8Type>, N>;
pub type SmallIntConsumer<N> = Consumer<PrimitiveCodec<Int16Type>, N>;
pub type IntConsumer<N> = Consumer<PrimitiveCodec<Int32Type>, N>;
pub type BigIntConsumer<N> = Consumer<PrimitiveCodec<Int64Type>, N>;
pub type FloatConsumer<N> = Consumer<PrimitiveCodec<Float32Type>, N>;
pub type DoubleConsumer<N> = Consumer<PrimitiveCodec<Float64Type>, N>;

/// Consumer for any integer or floating-point column.
pub fn create_primitive_consumer<T: ReadPrimitive>(
    vector: PrimitiveColumn<T>,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(
        vector,
        PrimitiveCodec::<T>::default(),
        column_index,
        NullMode::from_nullable(nullable),
    )
}

pub fn create_bit_consumer(
    vector: BooleanColumn,
    column_index: usize,
    nullable: bool,
) -> Box<dyn ColumnConsumer> {
    boxed_consumer(vector, BooleanCodec, column_index, NullMode::from_nullable(nullable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRowSource, Value};
    use arrow_array::cast::AsArray;
    use arrow_array::Array;

    fn run(mut consumer: Box<dyn ColumnConsumer>, mut source: MemoryRowSource) -> ArrayRef {
        while source.advance().unwrap() {
            consumer.consume(&source).unwrap();
        }
        consumer.finish_batch().unwrap()
    }

    #[test]
    fn big_ints_and_doubles() {
        let source = MemoryRowSource::from_rows(vec![
            vec![Value::Int(i64::MAX), Value::Float(1.5)],
            vec![Value::Null, Value::Int(2)],
        ]);
        let ints = run(
            create_primitive_consumer(PrimitiveColumn::<Int64Type>::with_capacity(2), 0, true),
            source.clone(),
        );
        let doubles = run(
            create_primitive_consumer(PrimitiveColumn::<Float64Type>::with_capacity(2), 1, true),
            source,
        );

        let ints = ints.as_primitive::<Int64Type>();
        assert_eq!(ints.value(0), i64::MAX);
        assert!(ints.is_null(1));
        assert_eq!(&doubles.as_primitive::<Float64Type>().values()[..], &[1.5, 2.0]);
    }

    #[test]
    fn small_int_out_of_range_is_a_read_error() {
        let mut consumer =
            create_primitive_consumer(PrimitiveColumn::<Int16Type>::with_capacity(1), 0, true);
        let mut source = MemoryRowSource::single_column([Value::Int(70_000)]);
        source.advance().unwrap();
        assert!(consumer.consume(&source).is_err());
    }

    #[test]
    fn booleans() {
        let source = MemoryRowSource::single_column([true.into(), Value::Null, false.into()]);
        let array = run(create_bit_consumer(BooleanColumn::with_capacity(3), 0, true), source);
        let bools = array.as_boolean();
        assert!(bools.value(0));
        assert!(bools.is_null(1));
        assert!(!bools.value(2));
    }
}
