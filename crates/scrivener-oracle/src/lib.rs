//! Scrivener Oracle Layer
//!
//! Implementations of the `Oracle` trait from `scrivener-domain`.
//!
//! # Providers
//!
//! - `MockOracle`: scripted replies for deterministic testing
//! - `HttpOracle`: chat-completions HTTP endpoint integration
//!
//! # Examples
//!
//! ```
//! use scrivener_oracle::MockOracle;
//! use scrivener_domain::{catalog, Oracle, OracleRequest};
//!
//! let oracle = MockOracle::new();
//! let request = OracleRequest {
//!     schema: catalog::target(),
//!     stored_preview: "None.".to_string(),
//!     table_context: "None.".to_string(),
//!     chunk_text: "Some text".to_string(),
//!     round: 1,
//! };
//! // With no scripted replies the mock signals completion.
//! let reply = oracle.propose(&request).unwrap();
//! assert!(reply.complete);
//! ```

#![warn(missing_docs)]

mod http;
mod mock;
mod parse;
mod prompt;

use thiserror::Error;

pub use http::HttpOracle;
pub use mock::MockOracle;
pub use parse::parse_reply;
pub use prompt::build_prompt;

/// Errors that can occur during oracle operations
#[derive(Error, Debug)]
pub enum OracleError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Reply could not be parsed into candidate items
    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    /// Model not available at the endpoint
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Oracle error: {0}")]
    Other(String),
}
