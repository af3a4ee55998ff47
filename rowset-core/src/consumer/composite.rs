//! All column consumers of one result set, driven together.

use arrow_array::RecordBatch;
use arrow_interop::{assemble_record_batch, new_column_buffer};
use arrow_schema::SchemaRef;
use tracing::trace;

use super::ColumnConsumer;
use crate::error::{ConsumerError, Result};
use crate::row_source::RowSource;

pub struct CompositeConsumer {
    schema: SchemaRef,
    consumers: Vec<Box<dyn ColumnConsumer>>,
}

impl CompositeConsumer {
    /// One consumer per schema field, in field order.
    pub fn try_new(schema: SchemaRef, consumers: Vec<Box<dyn ColumnConsumer>>) -> Result<Self> {
        if consumers.len() != schema.fields().len() {
            return Err(ConsumerError::Configuration(format!(
                "schema has {} fields but {} consumers were supplied",
                schema.fields().len(),
                consumers.len()
            )));
        }
        for (field, consumer) in schema.fields().iter().zip(&consumers) {
            if consumer.data_type() != field.data_type() {
                return Err(ConsumerError::Configuration(format!(
                    "consumer for column '{}' writes {:?}, schema declares {:?}",
                    field.name(),
                    consumer.data_type(),
                    field.data_type()
                )));
            }
        }
        Ok(Self { schema, consumers })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn consumers(&self) -> &[Box<dyn ColumnConsumer>] {
        &self.consumers
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    /// Run every column consumer against the current row, in ordinal order.
    pub fn consume(&mut self, source: &dyn RowSource) -> Result<()> {
        for consumer in &mut self.consumers {
            consumer.consume(source)?;
        }
        Ok(())
    }

    /// Move every column out and assemble a batch of `row_count` rows.
    pub fn finish_batch(&mut self, row_count: usize) -> Result<RecordBatch> {
        let columns = self
            .consumers
            .iter_mut()
            .map(|consumer| consumer.finish_batch())
            .collect::<Result<Vec<_>>>()?;
        trace!("Assembling batch of {} rows from {} columns", row_count, columns.len());
        Ok(assemble_record_batch(self.schema.clone(), columns, row_count)?)
    }

    /// Reset every consumer in place.
    pub fn reuse_vectors(&mut self) {
        for consumer in &mut self.consumers {
            consumer.reuse_vector();
        }
    }

    /// Hand every consumer a freshly allocated buffer. The previous buffers
    /// are dropped.
    pub fn reset_vectors(&mut self, capacity: usize) -> Result<()> {
        for (field, consumer) in self.schema.fields().iter().zip(&mut self.consumers) {
            let fresh = new_column_buffer(field.data_type(), capacity)?;
            let _old = consumer.reset_value_vector(fresh)?;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        for consumer in &mut self.consumers {
            consumer.close();
        }
    }
}
