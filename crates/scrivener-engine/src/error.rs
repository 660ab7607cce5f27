//! Engine error types

use scrivener_chunker::ChunkerError;
use scrivener_ledger::LedgerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an extraction run
///
/// Everything here is raised before or between chunks; within a chunk,
/// record-level failures are warnings and never abort the run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Chunker configuration or processing error
    #[error(transparent)]
    Chunker(#[from] ChunkerError),

    /// Document exceeds the hard token ceiling
    #[error("Document has ~{tokens} tokens, over the limit of {limit}")]
    DocumentTooLarge {
        /// Estimated document tokens
        tokens: usize,
        /// Configured ceiling
        limit: usize,
    },

    /// Ledger read or write failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Output artifact read or write failed
    #[error("Output store I/O error at {path}: {source}")]
    Store {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Output artifact did not parse as a JSON array
    #[error("Corrupt output artifact at {path}: {message}")]
    CorruptStore {
        /// Path of the artifact
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// JSON serialization failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
