use thiserror::Error;

/// Failure reported by a [`RowSource`](crate::row_source::RowSource) while
/// reading the current row.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("no current row; advance() has not returned true")]
    NoCurrentRow,

    #[error("column {column} is out of range for a row of {count} columns")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: usize,
        expected: &'static str,
        found: String,
    },

    #[error("column {column}: value does not fit in {target}")]
    OutOfRange { column: usize, target: &'static str },

    #[error("driver error: {0}")]
    Driver(String),
}

/// Errors raised while building consumers or moving rows into columns.
///
/// Any error returned from a consume call leaves the batch in progress with
/// misaligned columns; the caller discards it.
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// The row source could not produce the requested value. Never retried.
    #[error("source read failed: {0}")]
    SourceRead(#[from] SourceError),

    /// A NOT NULL column received NULL while strict nullability is enabled.
    #[error("column {column} is declared NOT NULL but the source returned NULL")]
    UnexpectedNull { column: usize },

    /// The value was read but cannot be represented in the column's type.
    #[error("column {column}: {reason}")]
    Conversion { column: usize, reason: String },

    /// Unsupported type, invalid setting or mismatched buffer. Raised before
    /// any row is read.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Assembling finished buffers into arrays failed.
    #[error(transparent)]
    Buffer(#[from] anyhow::Error),
}

pub type Result<T, E = ConsumerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_convert() {
        let err: ConsumerError = SourceError::Driver("socket closed".into()).into();
        assert!(matches!(err, ConsumerError::SourceRead(SourceError::Driver(_))));
        assert_eq!(err.to_string(), "source read failed: driver error: socket closed");
    }

    #[test]
    fn buffer_errors_are_transparent() {
        let err: ConsumerError = anyhow::anyhow!("offsets overflow").into();
        assert_eq!(err.to_string(), "offsets overflow");
    }
}
