//! Row-at-a-time result sets into Arrow record batches.
//!
//! Re-exports the two workspace crates: [`interop`] holds the Arrow column
//! buffers, [`rowset`] the row source contract, consumers and batch driver.

pub use arrow_interop as interop;
pub use rowset_core as rowset;

pub use rowset_core::{
    collect_batches, create_consumer, create_consumers, ColumnConsumer, ConsumerConfig,
    ConsumerError, MemoryRowSource, RowBatchIterator, RowSource, SourceError, Value,
};
