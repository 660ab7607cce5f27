//! Error types for the chunker

use thiserror::Error;

/// Errors that can occur during chunking
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Chunk size budget of zero tokens
    #[error("chunk_size_tokens must be positive")]
    ZeroChunkSize,

    /// Boundary mode other than paragraph-or-sentence
    #[error("Unsupported boundary_mode: {0}")]
    UnsupportedBoundaryMode(String),
}
