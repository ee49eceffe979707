//! Row sink trait and output errors

use crate::model::ProductVariantRecord;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for extracted records
///
/// Sinks are driven by a single writer task, so implementations need no
/// internal locking. A record is appended whole or not at all.
pub trait RowSink: Send {
    /// Appends one record
    fn append(&mut self, record: &ProductVariantRecord) -> OutputResult<()>;

    /// Flushes buffered rows; called once after the last append
    fn finish(&mut self) -> OutputResult<()>;
}

impl<S: RowSink + ?Sized> RowSink for Box<S> {
    fn append(&mut self, record: &ProductVariantRecord) -> OutputResult<()> {
        (**self).append(record)
    }

    fn finish(&mut self) -> OutputResult<()> {
        (**self).finish()
    }
}
