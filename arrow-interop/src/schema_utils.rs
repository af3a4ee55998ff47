use anyhow::{bail, Result};
use arrow_schema::{DataType, Field, Schema, TimeUnit};

/// Whether a column of `data_type` can be filled from a row source.
pub fn is_consumable(data_type: &DataType) -> bool {
    match data_type {
        DataType::Null
        | DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Utf8
        | DataType::Binary
        | DataType::Date32
        | DataType::Date64
        | DataType::Time32(TimeUnit::Millisecond)
        | DataType::Time64(TimeUnit::Microsecond)
        | DataType::Timestamp(_, _) => true,
        DataType::Decimal128(_, scale) => *scale >= 0,
        DataType::List(element) => is_consumable(element.data_type()),
        DataType::Struct(fields) => {
            !fields.is_empty() && fields.iter().all(|f| is_consumable(f.data_type()))
        }
        _ => false,
    }
}

pub trait SchemaExt {
    /// Fields whose type no consumer can fill.
    fn unsupported_fields(&self) -> Vec<&Field>;
    /// Fail with the first unsupported field.
    fn ensure_consumable(&self) -> Result<()>;
}

impl SchemaExt for Schema {
    fn unsupported_fields(&self) -> Vec<&Field> {
        self.fields()
            .iter()
            .filter(|f| !is_consumable(f.data_type()))
            .map(|f| f.as_ref())
            .collect()
    }

    fn ensure_consumable(&self) -> Result<()> {
        if let Some(field) = self.unsupported_fields().first() {
            bail!(
                "Column '{}' has unsupported type {:?}",
                field.name(),
                field.data_type()
            );
        }
        Ok(())
    }
}
