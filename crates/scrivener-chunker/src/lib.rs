//! Scrivener Chunker
//!
//! Splits a markdown document into ordered, token-bounded, boundary-safe
//! chunks with optional overlap, and extracts table metadata per chunk.
//!
//! # Architecture
//!
//! ```text
//! Document text → Block parser → oversized-paragraph split → greedy
//! accumulation → overlap injection → Chunks
//! ```
//!
//! Blocks are paragraphs or tables; headings update a breadcrumb stack used
//! to recognize "the same logical table" across chunks via a stable
//! signature. With `keep_tables_intact` set, a table block is never split
//! between chunks even when it alone exceeds the token budget.

#![warn(missing_docs)]

mod blocks;
mod chunker;
mod error;
mod source;
mod token;

pub use blocks::{parse_blocks, table_signature, Block, BlockKind, TableInfo};
pub use chunker::{chunk_document, Chunk, ChunkerConfig, BOUNDARY_PARAGRAPH_OR_SENTENCE};
pub use error::ChunkerError;
pub use source::SourceDocument;
pub use token::{HeuristicCounter, TokenCounter};
