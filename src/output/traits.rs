//! Record sink trait and output errors

use crate::extract::Record;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for deduplicated records
///
/// Implementations are append-only: a batch that was written successfully
/// must survive a later crash or interrupt.
pub trait RecordSink: Send {
    /// Durably appends a batch of records
    ///
    /// # Returns
    ///
    /// The number of records written
    fn write_batch(&mut self, records: &[Record]) -> OutputResult<usize>;

    /// Where records end up, if they end up on disk
    fn location(&self) -> Option<&Path>;
}
