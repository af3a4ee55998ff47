//! Arrow column buffers filled one value at a time.
//!
//! This crate provides the destination side of row-to-column conversion:
//! owned, growable builders that accept writes at increasing positions,
//! record skipped positions as nulls, and hand their contents over as Arrow
//! arrays at a batch boundary.
//!
//! # Write contract
//!
//! Every buffer exposes `set_safe(index, value)`:
//!
//! ```text
//! set_safe(0, a)  set_safe(2, c)  set_value_count(4)
//! [  a  |  null  |  c  |  null  ]
//! ```
//!
//! Positions never move backwards within a batch, and writes never fail on
//! capacity; builders grow as needed. `finish()` moves the values out and
//! leaves the buffer empty, ready for the next batch.

pub mod byte_buffer;
pub mod column_buffer;
pub mod nested_buffer;
pub mod record_batch_convert;
pub mod schema_utils;

pub use byte_buffer::{BinaryColumn, ByteColumn, Utf8Column};
pub use column_buffer::{BooleanColumn, ColumnBuffer, NullColumn, PrimitiveColumn};
pub use nested_buffer::{ListColumn, StructColumn};
pub use record_batch_convert::{assemble_record_batch, new_column_buffer};
pub use schema_utils::{is_consumable, SchemaExt};
