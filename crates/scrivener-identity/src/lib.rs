//! Deterministic record identity and deduplication
//!
//! Every accepted record gets a stable UUID derived from its content, so
//! re-running extraction over the same document reproduces the same
//! identifiers and never stores the same logical record twice.

#![warn(missing_docs)]

mod engine;
mod placeholder;

pub use engine::{
    class_namespace, content_hash, derive_id, seed_from_stored, Admission, IdentityEngine,
};
pub use placeholder::{is_placeholder, placeholder_id};
