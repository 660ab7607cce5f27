//! Scrivener Domain Layer
//!
//! Core data model for the reconciliation pipeline. This crate defines the
//! record schemas, the generic evidence wrapper, canonical records, and the
//! trait boundary toward the external extraction oracle. Infrastructure
//! implementations (chunking, verification, identity, persistence) live in
//! the other crates.
//!
//! ## Key Concepts
//!
//! - **RecordSchema**: a named record class with plain and evidence-required
//!   fields
//! - **Evidence**: a claimed value backed by a verbatim quote and a
//!   confidence score
//! - **CanonicalRecord**: a verified, typed, identified record that is never
//!   mutated after acceptance
//! - **Canonical JSON**: the deterministic serialization used for identity
//!   derivation and deduplication

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod catalog;
pub mod evidence;
pub mod record;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use canonical::canonical_json;
pub use evidence::Evidence;
pub use record::{CanonicalRecord, Proof, RecordId};
pub use schema::{FieldKind, FieldSpec, RecordSchema, ScalarType};
pub use traits::{Oracle, OracleReply, OracleRequest};
