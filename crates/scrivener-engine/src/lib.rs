//! Scrivener Reconciliation Engine
//!
//! Drives the whole pipeline for one record class at a time: chunk the
//! document, feed each chunk to the oracle in bounded rounds, verify every
//! claimed item against the chunk text, assign deterministic identifiers,
//! drop duplicates, persist accepted records, and keep the cross-chunk
//! table ledger current.
//!
//! Chunks are processed strictly in order; chunk *k+1* never starts before
//! chunk *k*'s accepted records are persisted and its ledger entry written,
//! because later chunks depend on earlier ledger state.

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod report;
mod store;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use report::ClassRunReport;
pub use store::OutputStore;
