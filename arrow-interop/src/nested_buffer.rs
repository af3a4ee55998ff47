//! Offsets and validity for nested columns.
//!
//! Nested buffers do not own their child data. Child values are written by
//! the child's own writer into its own buffer; the parent only records where
//! each row starts and ends (lists) or whether the row is present (structs).
//! At flush time the finished child arrays are handed to `finish`.

use std::any::Any;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow_array::{Array, ArrayRef, ListArray, StructArray};
use arrow_buffer::{NullBufferBuilder, OffsetBuffer, ScalarBuffer};
use arrow_schema::{DataType, FieldRef, Fields};

use crate::column_buffer::ColumnBuffer;

/// `List<T>` column: one `i32` end offset per row into a child array.
#[derive(Debug)]
pub struct ListColumn {
    data_type: DataType,
    element: FieldRef,
    offsets: Vec<i32>,
    validity: NullBufferBuilder,
}

impl ListColumn {
    pub fn try_new(data_type: DataType, capacity: usize) -> Result<Self> {
        let element = match &data_type {
            DataType::List(element) => Arc::clone(element),
            other => bail!("ListColumn requires a List data type, got {:?}", other),
        };
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Ok(Self {
            data_type,
            element,
            offsets,
            validity: NullBufferBuilder::new(capacity),
        })
    }

    /// Field describing the list elements.
    pub fn element_field(&self) -> &FieldRef {
        &self.element
    }

    /// Close the list at `index`; its elements end at `end` in the child.
    pub fn set_safe(&mut self, index: usize, end: usize) -> Result<()> {
        self.pad_to(index);
        let end = i32::try_from(end)
            .with_context(|| format!("List child offset {} overflows i32", end))?;
        let start = self.last_offset();
        if end < start {
            bail!("List offsets must not decrease: {} after {}", end, start);
        }
        self.offsets.push(end);
        self.validity.append_non_null();
        Ok(())
    }

    /// Move the offsets out and combine them with the finished child values.
    pub fn finish(&mut self, values: ArrayRef) -> Result<ArrayRef> {
        let offsets = std::mem::replace(&mut self.offsets, vec![0]);
        let nulls = self.validity.finish();
        let array = ListArray::try_new(
            Arc::clone(&self.element),
            OffsetBuffer::new(ScalarBuffer::from(offsets)),
            values,
            nulls,
        )
        .context("Building ListArray from buffered offsets")?;
        Ok(Arc::new(array))
    }

    fn last_offset(&self) -> i32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    fn pad_to(&mut self, index: usize) {
        let len = self.len();
        debug_assert!(index >= len, "list writes must move forward");
        if index > len {
            let last = self.last_offset();
            self.offsets.extend(std::iter::repeat(last).take(index - len));
            self.validity.append_n_nulls(index - len);
        }
    }
}

impl ColumnBuffer for ListColumn {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn set_value_count(&mut self, count: usize) {
        self.pad_to(count);
    }

    fn clear(&mut self) {
        self.offsets.truncate(1);
        self.validity.finish();
    }

    fn release(&mut self) {
        self.offsets = vec![0];
        self.validity = NullBufferBuilder::new(0);
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// `Struct` column: only the per-row validity lives here.
#[derive(Debug)]
pub struct StructColumn {
    data_type: DataType,
    fields: Fields,
    validity: NullBufferBuilder,
}

impl StructColumn {
    pub fn try_new(data_type: DataType, capacity: usize) -> Result<Self> {
        let fields = match &data_type {
            DataType::Struct(fields) if !fields.is_empty() => fields.clone(),
            DataType::Struct(_) => bail!("StructColumn requires at least one field"),
            other => bail!("StructColumn requires a Struct data type, got {:?}", other),
        };
        Ok(Self {
            data_type,
            fields,
            validity: NullBufferBuilder::new(capacity),
        })
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Mark the struct at `index` as present.
    pub fn set_safe(&mut self, index: usize) {
        self.pad_to(index);
        self.validity.append_non_null();
    }

    /// Combine the finished children (in field order) into a `StructArray`.
    pub fn finish(&mut self, children: Vec<ArrayRef>) -> Result<ArrayRef> {
        let len = self.len();
        if let Some(child) = children.iter().find(|c| c.len() != len) {
            bail!(
                "Struct child length {} does not match struct length {}",
                child.len(),
                len
            );
        }
        let nulls = self.validity.finish();
        let array = StructArray::try_new(self.fields.clone(), children, nulls)
            .context("Building StructArray from buffered children")?;
        Ok(Arc::new(array))
    }

    fn pad_to(&mut self, index: usize) {
        let len = self.len();
        debug_assert!(index >= len, "struct writes must move forward");
        if index > len {
            self.validity.append_n_nulls(index - len);
        }
    }
}

impl ColumnBuffer for StructColumn {
    fn data_type(&self) -> &DataType {
        &self.data_type
    }

    fn len(&self) -> usize {
        self.validity.len()
    }

    fn set_value_count(&mut self, count: usize) {
        self.pad_to(count);
    }

    fn clear(&mut self) {
        self.validity.finish();
    }

    fn release(&mut self) {
        self.validity = NullBufferBuilder::new(0);
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;
    use arrow_array::types::Int32Type;
    use arrow_array::{Array, Int32Array, StringArray};
    use arrow_schema::Field;

    fn int_list() -> DataType {
        DataType::List(Arc::new(Field::new("item", DataType::Int32, true)))
    }

    #[test]
    fn list_rows_with_null_gap() {
        let mut col = ListColumn::try_new(int_list(), 4).unwrap();
        col.set_safe(0, 2).unwrap();
        // row 1 is null
        col.set_safe(2, 3).unwrap();
        col.set_value_count(4);

        let values = Arc::new(Int32Array::from(vec![1, 2, 3])) as ArrayRef;
        let array = col.finish(values).unwrap();
        let list = array.as_list::<i32>();
        assert_eq!(list.len(), 4);
        assert_eq!(list.value_offsets(), &[0, 2, 2, 3, 3]);
        assert!(list.is_null(1));
        assert!(list.is_null(3));
        assert_eq!(list.value(2).as_primitive::<Int32Type>().value(0), 3);
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn list_clear_resets_offsets() {
        let mut col = ListColumn::try_new(int_list(), 2).unwrap();
        col.set_safe(0, 3).unwrap();
        col.set_safe(2, 4).unwrap();
        col.clear();
        assert_eq!(col.len(), 0);

        col.set_safe(0, 1).unwrap();
        let values = Arc::new(Int32Array::from(vec![5])) as ArrayRef;
        let array = col.finish(values).unwrap();
        assert_eq!(array.as_list::<i32>().value_offsets(), &[0, 1]);
    }

    #[test]
    fn list_rejects_decreasing_offsets() {
        let mut col = ListColumn::try_new(int_list(), 2).unwrap();
        col.set_safe(0, 3).unwrap();
        assert!(col.set_safe(1, 1).is_err());
    }

    #[test]
    fn struct_validity_and_children() {
        let fields = Fields::from(vec![Field::new("name", DataType::Utf8, true)]);
        let mut col = StructColumn::try_new(DataType::Struct(fields), 2).unwrap();
        col.set_safe(1);

        let names = Arc::new(StringArray::from(vec![None, Some("x")])) as ArrayRef;
        let array = col.finish(vec![names]).unwrap();
        let structs = array.as_struct();
        assert!(structs.is_null(0));
        assert!(structs.is_valid(1));
    }

    #[test]
    fn struct_child_length_mismatch() {
        let fields = Fields::from(vec![Field::new("a", DataType::Int32, true)]);
        let mut col = StructColumn::try_new(DataType::Struct(fields), 2).unwrap();
        col.set_safe(0);
        let child = Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef;
        assert!(col.finish(vec![child]).is_err());
    }
}
