//! Batch driver: pulls rows from a source and emits `RecordBatch`es.

use arrow_array::RecordBatch;
use arrow_interop::SchemaExt;
use arrow_schema::SchemaRef;
use tracing::{debug, info, warn};

use crate::config::ConsumerConfig;
use crate::consumer::composite::CompositeConsumer;
use crate::consumer::ColumnConsumer;
use crate::error::{ConsumerError, Result};
use crate::factory::create_consumers;
use crate::row_source::RowSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Exhausted,
    Failed,
}

/// Iterator of record batches read from a row source.
///
/// Rows are consumed until the target batch size is reached or the source is
/// exhausted, then the column buffers are flushed into a batch. Consumers
/// are reset only when another row arrives, so the buffers of the last batch
/// are never reset. An empty source yields a single empty batch. The first
/// error ends the iteration.
pub struct RowBatchIterator<S: RowSource> {
    source: S,
    composite: CompositeConsumer,
    config: ConsumerConfig,
    state: ScanState,
    closed: bool,
    batches_emitted: usize,
    rows_read: usize,
    resets: usize,
}

impl<S: RowSource> RowBatchIterator<S> {
    /// Build consumers for every field of `schema` and read from `source`.
    pub fn new(source: S, schema: SchemaRef, config: ConsumerConfig) -> Result<Self> {
        config.validate()?;
        schema
            .ensure_consumable()
            .map_err(|e| ConsumerError::Configuration(e.to_string()))?;
        let consumers = create_consumers(&schema, &config)?;
        Self::with_consumers(source, schema, consumers, config)
    }

    /// Read from `source` with caller-built consumers, one per field.
    pub fn with_consumers(
        source: S,
        schema: SchemaRef,
        consumers: Vec<Box<dyn ColumnConsumer>>,
        config: ConsumerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let composite = CompositeConsumer::try_new(schema, consumers)?;
        info!(
            "Starting scan of {} columns, batch size {:?}",
            composite.len(),
            config.target_batch_size
        );
        Ok(Self {
            source,
            composite,
            config,
            state: ScanState::Scanning,
            closed: false,
            batches_emitted: 0,
            rows_read: 0,
            resets: 0,
        })
    }

    pub fn schema(&self) -> &SchemaRef {
        self.composite.schema()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn batches_emitted(&self) -> usize {
        self.batches_emitted
    }

    /// Number of times the consumers were reset between batches.
    pub fn reset_count(&self) -> usize {
        self.resets
    }

    /// Next batch, `Ok(None)` once the scan is over.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>> {
        if self.state != ScanState::Scanning {
            return Ok(None);
        }
        match self.load_batch() {
            Ok(batch) => Ok(batch),
            Err(e) => {
                warn!(
                    "Scan aborted after {} rows in {} batches: {}",
                    self.rows_read, self.batches_emitted, e
                );
                self.state = ScanState::Failed;
                self.close();
                Err(e)
            }
        }
    }

    fn load_batch(&mut self) -> Result<Option<RecordBatch>> {
        let mut rows = 0;
        while self.config.target_batch_size.map_or(true, |limit| rows < limit) {
            if !self.source.advance()? {
                self.state = ScanState::Exhausted;
                break;
            }
            if rows == 0 && self.batches_emitted > 0 {
                self.reset_consumers()?;
            }
            self.composite.consume(&self.source)?;
            rows += 1;
        }

        if rows == 0 && self.batches_emitted > 0 {
            self.finish_scan();
            return Ok(None);
        }

        let batch = self.composite.finish_batch(rows)?;
        self.batches_emitted += 1;
        self.rows_read += rows;
        debug!("Flushed batch {} with {} rows", self.batches_emitted, rows);

        if self.state == ScanState::Exhausted {
            self.finish_scan();
        }
        Ok(Some(batch))
    }

    fn reset_consumers(&mut self) -> Result<()> {
        if self.config.reuse_vectors {
            self.composite.reuse_vectors();
        } else {
            self.composite.reset_vectors(self.config.buffer_capacity())?;
        }
        self.resets += 1;
        debug!(
            "Reset consumers for batch {} (reuse vectors: {})",
            self.batches_emitted + 1,
            self.config.reuse_vectors
        );
        Ok(())
    }

    fn finish_scan(&mut self) {
        self.state = ScanState::Exhausted;
        info!(
            "Scan complete: {} rows in {} batches",
            self.rows_read, self.batches_emitted
        );
        self.close();
    }

    /// Close every consumer. Later calls do nothing.
    pub fn close(&mut self) {
        if !self.closed {
            self.composite.close();
            self.closed = true;
        }
    }
}

impl<S: RowSource> Iterator for RowBatchIterator<S> {
    type Item = Result<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

impl<S: RowSource> Drop for RowBatchIterator<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Drain `source` into batches.
pub fn collect_batches<S: RowSource>(
    source: S,
    schema: SchemaRef,
    config: ConsumerConfig,
) -> Result<Vec<RecordBatch>> {
    RowBatchIterator::new(source, schema, config)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRowSource, Value};
    use arrow_array::cast::AsArray;
    use arrow_array::types::Int32Type;
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, true)]))
    }

    fn source(n: i32) -> MemoryRowSource {
        MemoryRowSource::single_column((0..n).map(Value::from))
    }

    #[test]
    fn splits_into_batches() {
        let config = ConsumerConfig::default().with_target_batch_size(2);
        let mut batches = RowBatchIterator::new(source(5), schema(), config).unwrap();
        let mut sizes = Vec::new();
        let mut values = Vec::new();
        while let Some(batch) = batches.next_batch().unwrap() {
            sizes.push(batch.num_rows());
            values.extend(batch.column(0).as_primitive::<Int32Type>().values().iter().copied());
        }
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
        assert_eq!(batches.reset_count(), 2);
        assert_eq!(batches.rows_read(), 5);
    }

    #[test]
    fn exact_multiple_has_no_trailing_batch() {
        let config = ConsumerConfig::default().with_target_batch_size(2);
        let mut batches = RowBatchIterator::new(source(4), schema(), config).unwrap();
        let sizes: Vec<_> = batches.by_ref().map(|b| b.unwrap().num_rows()).collect();
        assert_eq!(sizes, vec![2, 2]);
        assert_eq!(batches.reset_count(), 1);
    }

    #[test]
    fn empty_source_yields_one_empty_batch() {
        let batches = collect_batches(source(0), schema(), ConsumerConfig::default()).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 0);
        assert_eq!(batches[0].schema(), schema());
    }

    #[test]
    fn unlimited_batch_size() {
        let config = ConsumerConfig::default().with_unlimited_batch_size();
        let batches = collect_batches(source(3000), schema(), config).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 3000);
    }

    #[test]
    fn fresh_buffers_give_same_rows() {
        let config = ConsumerConfig::default()
            .with_target_batch_size(3)
            .with_reuse_vectors(false);
        let batches = collect_batches(source(7), schema(), config).unwrap();
        let sizes: Vec<_> = batches.iter().map(|b| b.num_rows()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(batches[2].column(0).as_primitive::<Int32Type>().value(0), 6);
    }

    #[test]
    fn error_ends_iteration() {
        let config = ConsumerConfig::default().with_target_batch_size(2);
        let mut batches =
            RowBatchIterator::new(source(5).with_failure(3, 0), schema(), config).unwrap();
        assert!(batches.next().unwrap().is_ok());
        assert!(matches!(batches.next(), Some(Err(ConsumerError::SourceRead(_)))));
        assert!(batches.next().is_none());
    }

    #[test]
    fn invalid_setup() {
        let config = ConsumerConfig::default().with_target_batch_size(0);
        assert!(RowBatchIterator::new(source(1), schema(), config).is_err());

        let unsupported = Arc::new(Schema::new(vec![Field::new("u", DataType::UInt64, true)]));
        assert!(matches!(
            RowBatchIterator::new(source(1), unsupported, ConsumerConfig::default()),
            Err(ConsumerError::Configuration(_))
        ));
    }
}
