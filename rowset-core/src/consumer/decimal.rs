use arrow_array::types::Decimal128Type;
use arrow_array::ArrayRef;
use arrow_interop::{ColumnBuffer, PrimitiveColumn};
use arrow_schema::DataType;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{boxed_consumer, ColumnConsumer, Consumer, NullMode, Slot, ValueCodec};
use crate::error::{ConsumerError, Result, SourceError};
use crate::row_source::RowSource;

/// Largest precision a `Decimal128` column can declare.
pub const MAX_DECIMAL128_PRECISION: u8 = 38;

/// Writes decimals as unscaled `i128` values at the column's scale.
///
/// Values with fewer fractional digits are scaled up exactly. Values with
/// more are rounded with the configured strategy, or rejected when there is
/// none.
#[derive(Debug, Clone)]
pub struct DecimalCodec {
    precision: u8,
    scale: u32,
    rounding: Option<RoundingStrategy>,
}

impl DecimalCodec {
    pub fn try_new(precision: u8, scale: i8, rounding: Option<RoundingStrategy>) -> Result<Self> {
        if precision == 0 || precision > MAX_DECIMAL128_PRECISION {
            return Err(ConsumerError::Configuration(format!(
                "decimal precision {} outside 1..={}",
                precision, MAX_DECIMAL128_PRECISION
            )));
        }
        let scale = u32::try_from(scale).map_err(|_| {
            ConsumerError::Configuration(format!("negative decimal scale {} is not supported", scale))
        })?;
        if scale > precision as u32 {
            return Err(ConsumerError::Configuration(format!(
                "decimal scale {} exceeds precision {}",
                scale, precision
            )));
        }
        Ok(Self {
            precision,
            scale,
            rounding,
        })
    }

    /// Unscaled representation of `value` at this codec's scale.
    pub fn to_unscaled(&self, value: Decimal) -> std::result::Result<i128, String> {
        let value = if value.scale() > self.scale {
            match self.rounding {
                Some(strategy) => value.round_dp_with_strategy(self.scale, strategy),
                None => {
                    return Err(format!(
                        "{} has scale {} but the column scale is {} and no rounding is configured",
                        value,
                        value.scale(),
                        self.scale
                    ))
                }
            }
        } else {
            value
        };

        let factor = 10_i128.pow(self.scale - value.scale());
        let unscaled = value
            .mantissa()
            .checked_mul(factor)
            .ok_or_else(|| format!("{} overflows at scale {}", value, self.scale))?;
        if unscaled.unsigned_abs() >= 10_u128.pow(self.precision as u32) {
            return Err(format!(
                "{} does not fit in DECIMAL({}, {})",
                value, self.precision, self.scale
            ));
        }
        Ok(unscaled)
    }
}

impl ValueCodec for DecimalCodec {
    type Buffer = PrimitiveColumn<Decimal128Type>;
    type Value<'s> = Decimal;

    fn read<'s>(&self, source: &'s dyn RowSource, column: usize) -> Result<Decimal, SourceError> {
        source.get_decimal(column)
    }

    fn write(&mut self, buffer: &mut Self::Buffer, slot: Slot, value: Decimal) -> Result<()> {
        let unscaled = self
            .to_unscaled(value)
            .map_err(|reason| ConsumerError::Conversion {
                column: slot.column,
                reason,
            })?;
        buffer.set_safe(slot.index, unscaled);
        Ok(())
    }

    fn finish(&mut self, buffer: &mut Self::Buffer) -> Result<ArrayRef> {
        Ok(buffer.finish())
    }
}

pub type DecimalConsumer<N> = Consumer<DecimalCodec, N>;

/// Decimal consumer for a buffer created with a `Decimal128(p, s)` type.
pub fn create_decimal_consumer(
    vector: PrimitiveColumn<Decimal128Type>,
    column_index: usize,
    nullable: bool,
    rounding: Option<RoundingStrategy>,
) -> Result<Box<dyn ColumnConsumer>> {
    let codec = match vector.data_type() {
        DataType::Decimal128(precision, scale) => {
            DecimalCodec::try_new(*precision, *scale, rounding)?
        }
        other => {
            return Err(ConsumerError::Configuration(format!(
                "decimal consumer needs a Decimal128 buffer, got {:?}",
                other
            )))
        }
    };
    Ok(boxed_consumer(vector, codec, column_index, NullMode::from_nullable(nullable)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRowSource, Value};
    use arrow_array::cast::AsArray;
    use arrow_array::Array;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn scales_up_exactly() {
        let codec = DecimalCodec::try_new(10, 3, None).unwrap();
        assert_eq!(codec.to_unscaled(dec("12.5")).unwrap(), 12_500);
        assert_eq!(codec.to_unscaled(dec("-7")).unwrap(), -7_000);
    }

    #[test]
    fn scale_down_needs_rounding() {
        let strict = DecimalCodec::try_new(10, 1, None).unwrap();
        assert!(strict.to_unscaled(dec("1.25")).is_err());

        let rounding = DecimalCodec::try_new(10, 1, Some(RoundingStrategy::MidpointAwayFromZero)).unwrap();
        assert_eq!(rounding.to_unscaled(dec("1.25")).unwrap(), 13);
        assert_eq!(rounding.to_unscaled(dec("-1.25")).unwrap(), -13);
    }

    #[test]
    fn precision_overflow() {
        let codec = DecimalCodec::try_new(4, 2, None).unwrap();
        assert_eq!(codec.to_unscaled(dec("99.99")).unwrap(), 9_999);
        assert!(codec.to_unscaled(dec("100.00")).is_err());
    }

    #[test]
    fn invalid_declarations() {
        assert!(DecimalCodec::try_new(0, 0, None).is_err());
        assert!(DecimalCodec::try_new(39, 0, None).is_err());
        assert!(DecimalCodec::try_new(10, -2, None).is_err());
        assert!(DecimalCodec::try_new(2, 3, None).is_err());
    }

    #[test]
    fn consumes_into_decimal128() {
        let dt = DataType::Decimal128(12, 2);
        let vector = PrimitiveColumn::<Decimal128Type>::try_with_data_type(dt.clone(), 3).unwrap();
        let mut consumer = create_decimal_consumer(vector, 0, true, None).unwrap();
        let mut source =
            MemoryRowSource::single_column([dec("3.14").into(), Value::Null, Value::Int(2)]);
        while source.advance().unwrap() {
            consumer.consume(&source).unwrap();
        }
        let array = consumer.finish_batch().unwrap();
        assert_eq!(array.data_type(), &dt);
        let values = array.as_primitive::<Decimal128Type>();
        assert_eq!(values.value(0), 314);
        assert!(values.is_null(1));
        assert_eq!(values.value(2), 200);
    }

    #[test]
    fn conversion_error_names_column() {
        let dt = DataType::Decimal128(3, 0);
        let vector = PrimitiveColumn::<Decimal128Type>::try_with_data_type(dt, 1).unwrap();
        let mut consumer = create_decimal_consumer(vector, 2, true, None).unwrap();
        let mut source = MemoryRowSource::new(3, vec![vec![Value::Null, Value::Null, dec("1000").into()]]);
        source.advance().unwrap();
        let err = consumer.consume(&source).unwrap_err();
        assert!(matches!(err, ConsumerError::Conversion { column: 2, .. }));
    }
}
