//! Scrivener Resolver
//!
//! The broader orchestration layer used by the foreign-key resolution
//! stage: runs independent record batches against the oracle concurrently.
//! Unlike the reconciliation engine, which is strictly sequential, batches
//! here have no cross-dependencies, so a worker pool fans them out while a
//! counting semaphore caps total concurrent oracle calls regardless of
//! worker count.

#![warn(missing_docs)]

mod config;
mod resolver;

pub use config::ResolverConfig;
pub use resolver::{Resolver, ResolverError};
