//! Run reporting

use serde::{Deserialize, Serialize};

/// Summary of one class's extraction over a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRunReport {
    /// Record class name
    pub class: String,

    /// Number of chunks processed
    pub chunk_count: usize,

    /// Records accepted and persisted in this run
    pub accepted: usize,

    /// Records dropped as duplicates
    pub duplicates: usize,

    /// Candidate items rejected by verification
    pub rejected: usize,

    /// Soft failures: oracle errors, exhausted rounds
    pub warnings: Vec<String>,
}

impl ClassRunReport {
    /// Create an empty report for a class
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            chunk_count: 0,
            accepted: 0,
            duplicates: 0,
            rejected: 0,
            warnings: Vec::new(),
        }
    }
}
