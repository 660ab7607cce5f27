//! Cross-chunk table context ledger
//!
//! When a logical table's rows are split across chunks, later chunks need
//! to see which rows were already accepted from the same table. The ledger
//! persists accepted items per `(record class, table signature, chunk)` and
//! serves them back, deduplicated and bounded, as oracle context.

#![warn(missing_docs)]

mod error;
mod ledger;

pub use error::LedgerError;
pub use ledger::{parse_table_signature, Ledger, TableItems};
