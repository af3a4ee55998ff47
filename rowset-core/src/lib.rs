//! Row-at-a-time to columnar conversion.
//!
//! A [`RowSource`] is a forward-only cursor over query results. Each result
//! column gets a consumer that reads its value from the current row and
//! appends it to an Arrow column buffer. A [`RowBatchIterator`] drives the
//! consumers over the source and flushes their buffers into `RecordBatch`es.
//!
//! ```no_run
//! use std::sync::Arc;
//! use arrow_schema::{DataType, Field, Schema};
//! use rowset_core::{collect_batches, ConsumerConfig, MemoryRowSource, Value};
//!
//! let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int8, true)]));
//! let source = MemoryRowSource::single_column([Value::Null, Value::Int(5), Value::Int(-3)]);
//! let batches = collect_batches(source, schema, ConsumerConfig::default())?;
//! assert_eq!(batches[0].num_rows(), 3);
//! # Ok::<(), rowset_core::ConsumerError>(())
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod factory;
pub mod iterator;
pub mod memory;
pub mod row_source;

pub use config::{ConsumerConfig, DEFAULT_TARGET_BATCH_SIZE};
pub use consumer::composite::CompositeConsumer;
pub use consumer::{
    boxed_consumer, ColumnConsumer, Consumer, NonNullable, NullMode, Nullability, Nullable,
    RejectNull, Slot, ValueCodec,
};
pub use error::{ConsumerError, Result, SourceError};
pub use factory::{create_consumer, create_consumers};
pub use iterator::{collect_batches, RowBatchIterator};
pub use memory::{MemoryRowSource, Value};
pub use row_source::{RowSource, ARRAY_VALUE_COLUMN};
