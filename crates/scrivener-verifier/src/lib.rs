//! Scrivener Evidence Verifier
//!
//! Decides, for one oracle-proposed record against one schema and one
//! chunk's source text, whether to accept it and in what form.
//!
//! Verification is all-or-nothing: every evidence-required field present on
//! a candidate must carry a non-empty quote found verbatim (after
//! normalization) in the source, and a confidence in [0.0, 1.0]; a single
//! failure rejects the whole record with per-field reasons. Accepted values
//! are coerced into their declared scalar types and each populated evidence
//! field gets a `<field>_proof` entry in the record's metadata map.

#![warn(missing_docs)]

mod coerce;
mod normalize;
mod verifier;

pub use coerce::coerce_value;
pub use normalize::{normalize_for_match, quote_is_valid};
pub use verifier::{confidence_is_valid, verify_record, RejectionReason, VerifiedRecord};
