//! List and struct columns.
//!
//! Nested codecs own child consumers. A list delegates every element to one
//! element consumer reading ordinal
//! [`ARRAY_VALUE_COLUMN`](crate::row_source::ARRAY_VALUE_COLUMN) of the array
//! source; a struct runs one child consumer per field against the attribute
//! source. Children are flushed, reset and closed together with their parent.

use arrow_array::ArrayRef;
use arrow_interop::{ListColumn, StructColumn};

use super::{boxed_consumer, ColumnConsumer, Consumer, NullMode, Slot, ValueCodec};
use crate::error::{ConsumerError, Result, SourceError};
use crate::row_source::RowSource;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub struct ListCodec {
    element: Box<dyn ColumnConsumer>,
}

impl ListCodec {
    pub fn new(element: Box<dyn ColumnConsumer>) -> Self {
        Self { element }
    }
}

impl std::fmt::Debug for ListCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCodec")
            .field("element_type", self.element.data_type())
            .field("elements", &self.element.current_index())
            .finish()
    }
}

impl ValueCodec for ListCodec {
    type Buffer = ListColumn;
    type Value<'s> = Box<dyn RowSource + 's>;

    fn read<'s>(
        &self,
        source: &'s dyn RowSource,
        column: usize,
    ) -> Result<Box<dyn RowSource + 's>, SourceError> {
        source.get_array(column)
    }

    fn write(
        &mut self,
        buffer: &mut ListColumn,
        slot: Slot,
        mut elements: Box<dyn RowSource + '_>,
    ) -> Result<()> {
        while elements.advance()? {
            self.element.consume(elements.as_ref())?;
        }
        buffer.set_safe(slot.index, self.element.current_index())?;
        Ok(())
    }

    fn finish(&mut self, buffer: &mut ListColumn) -> Result<ArrayRef> {
        let values = self.element.finish_batch()?;
        Ok(buffer.finish(values)?)
    }

    fn reset(&mut self) {
        self.element.reuse_vector();
    }

    fn close(&mut self) {
        self.element.close();
    }
}

// ---------------------------------------------------------------------------
// Struct
// ---------------------------------------------------------------------------

pub struct StructCodec {
    children: Vec<Box<dyn ColumnConsumer>>,
}

impl StructCodec {
    pub fn new(children: Vec<Box<dyn ColumnConsumer>>) -> Self {
        Self { children }
    }
}

impl std::fmt::Debug for StructCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructCodec")
            .field("children", &self.children.len())
            .finish()
    }
}

impl ValueCodec for StructCodec {
    type Buffer = StructColumn;
    type Value<'s> = Box<dyn RowSource + 's>;

    fn read<'s>(
        &self,
        source: &'s dyn RowSource,
        column: usize,
    ) -> Result<Box<dyn RowSource + 's>, SourceError> {
        source.get_struct(column)
    }

    fn write(
        &mut self,
        buffer: &mut StructColumn,
        slot: Slot,
        attributes: Box<dyn RowSource + '_>,
    ) -> Result<()> {
        for child in &mut self.children {
            child.consume(attributes.as_ref())?;
        }
        buffer.set_safe(slot.index);
        Ok(())
    }

    /// Children skip the row so they stay aligned with the parent.
    fn write_null(&mut self, _buffer: &mut StructColumn, _slot: Slot) {
        for child in &mut self.children {
            child.skip();
        }
    }

    fn finish(&mut self, buffer: &mut StructColumn) -> Result<ArrayRef> {
        let children = self
            .children
            .iter_mut()
            .map(|child| child.finish_batch())
            .collect::<Result<Vec<_>>>()?;
        Ok(buffer.finish(children)?)
    }

    fn reset(&mut self) {
        for child in &mut self.children {
            child.reuse_vector();
        }
    }

    fn close(&mut self) {
        for child in &mut self.children {
            child.close();
        }
    }
}

pub type ListConsumer<N> = Consumer<ListCodec, N>;
pub type StructConsumer<N> = Consumer<StructCodec, N>;

/// List consumer whose elements are written by `element`, a consumer built
/// for the list's element field reading ordinal
/// [`ARRAY_VALUE_COLUMN`](crate::row_source::ARRAY_VALUE_COLUMN).
pub fn create_list_consumer(
    vector: ListColumn,
    element: Box<dyn ColumnConsumer>,
    column_index: usize,
    nullable: bool,
) -> Result<Box<dyn ColumnConsumer>> {
    if element.data_type() != vector.element_field().data_type() {
        return Err(ConsumerError::Configuration(format!(
            "list element consumer writes {:?}, list expects {:?}",
            element.data_type(),
            vector.element_field().data_type()
        )));
    }
    Ok(boxed_consumer(
        vector,
        ListCodec::new(element),
        column_index,
        NullMode::from_nullable(nullable),
    ))
}

/// Struct consumer with one child per field, in field order.
pub fn create_struct_consumer(
    vector: StructColumn,
    children: Vec<Box<dyn ColumnConsumer>>,
    column_index: usize,
    nullable: bool,
) -> Result<Box<dyn ColumnConsumer>> {
    if children.len() != vector.fields().len() {
        return Err(ConsumerError::Configuration(format!(
            "struct has {} fields but {} child consumers were supplied",
            vector.fields().len(),
            children.len()
        )));
    }
    Ok(boxed_consumer(
        vector,
        StructCodec::new(children),
        column_index,
        NullMode::from_nullable(nullable),
    ))
}
