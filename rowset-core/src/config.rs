use chrono::FixedOffset;
use rust_decimal::RoundingStrategy;

use crate::error::{ConsumerError, Result};

/// Rows per batch when nothing else is configured.
pub const DEFAULT_TARGET_BATCH_SIZE: usize = 1024;

/// Settings shared by the consumer factory and the batch iterator.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Rows per emitted batch. `None` reads the whole result into one batch.
    pub target_batch_size: Option<usize>,
    /// Fixed offset the source applies when reading timestamps.
    pub calendar: Option<FixedOffset>,
    /// Reset consumers in place between batches instead of handing them
    /// freshly allocated buffers.
    pub reuse_vectors: bool,
    /// Fail on NULL in columns declared NOT NULL instead of storing the
    /// source's placeholder value.
    pub strict_nullability: bool,
    /// Rounding applied when a decimal carries more fractional digits than
    /// its column. Without one such values are rejected.
    pub decimal_rounding: Option<RoundingStrategy>,
    /// Builder capacity hint per column.
    pub initial_capacity: Option<usize>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            target_batch_size: Some(DEFAULT_TARGET_BATCH_SIZE),
            calendar: None,
            reuse_vectors: true,
            strict_nullability: false,
            decimal_rounding: None,
            initial_capacity: None,
        }
    }
}

impl ConsumerConfig {
    pub fn with_target_batch_size(mut self, rows: usize) -> Self {
        self.target_batch_size = Some(rows);
        self
    }

    pub fn with_unlimited_batch_size(mut self) -> Self {
        self.target_batch_size = None;
        self
    }

    pub fn with_calendar(mut self, calendar: FixedOffset) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_reuse_vectors(mut self, reuse: bool) -> Self {
        self.reuse_vectors = reuse;
        self
    }

    pub fn with_strict_nullability(mut self, strict: bool) -> Self {
        self.strict_nullability = strict;
        self
    }

    pub fn with_decimal_rounding(mut self, strategy: RoundingStrategy) -> Self {
        self.decimal_rounding = Some(strategy);
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_batch_size == Some(0) {
            return Err(ConsumerError::Configuration(
                "target batch size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Capacity each column buffer starts with.
    pub fn buffer_capacity(&self) -> usize {
        self.initial_capacity.unwrap_or_else(|| {
            self.target_batch_size
                .map_or(DEFAULT_TARGET_BATCH_SIZE, |rows| rows.min(DEFAULT_TARGET_BATCH_SIZE))
        })
    }
}
