//! Trait definitions for external interactions
//!
//! These traits define the boundary between the reconciliation core and the
//! untrusted extraction oracle. Implementations live in `scrivener-oracle`.

use crate::schema::RecordSchema;
use serde_json::Value;

/// One request to the extraction oracle for one chunk and one record class
#[derive(Debug, Clone)]
pub struct OracleRequest {
    /// Schema of the record class being extracted
    pub schema: RecordSchema,

    /// Bounded preview of already-stored records for this class
    pub stored_preview: String,

    /// Cross-chunk table context block, or "None." when empty
    pub table_context: String,

    /// The chunk's text
    pub chunk_text: String,

    /// 1-based round number within the current chunk
    pub round: usize,
}

/// The oracle's answer: candidate items, or a completion signal
///
/// Items are raw JSON objects using the schema's field names; every
/// evidence-required field must be supplied as `{value, quote, confidence}`.
/// Nothing in a reply is trusted until it passes the verifier.
#[derive(Debug, Clone, Default)]
pub struct OracleReply {
    /// Zero or more candidate record objects
    pub items: Vec<Value>,

    /// Free-form notes about where the items came from; may carry a
    /// `table_signature = <sig>` marker for table attribution
    pub source_notes: Option<String>,

    /// True when the oracle signals extraction is complete for this chunk
    pub complete: bool,
}

/// Trait for the external extraction oracle
///
/// Implemented by the infrastructure layer (`scrivener-oracle`). Each call
/// is one blocking request/response round; retry and backoff policy toward
/// the service is the implementation's concern, not the core's.
pub trait Oracle {
    /// Error type for oracle operations
    type Error;

    /// Propose candidate records for one chunk of source text
    fn propose(&self, request: &OracleRequest) -> Result<OracleReply, Self::Error>;
}
