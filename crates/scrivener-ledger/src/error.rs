//! Ledger error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from ledger reads and writes
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Filesystem operation failed
    #[error("Ledger I/O error at {path}: {source}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Entry payload could not be serialized
    #[error("Failed to serialize ledger entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
