//! Sequential reconciliation over chunks

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::report::ClassRunReport;
use crate::store::OutputStore;
use scrivener_chunker::{chunk_document, Chunk, HeuristicCounter, SourceDocument, TokenCounter};
use scrivener_domain::{
    canonical_json, CanonicalRecord, Oracle, OracleRequest, RecordId, RecordSchema,
};
use scrivener_identity::{placeholder_id, Admission, IdentityEngine};
use scrivener_ledger::{parse_table_signature, Ledger, TableItems};
use scrivener_verifier::verify_record;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The reconciliation engine
///
/// Owns the oracle, the configuration, the output directory, and the table
/// ledger. One engine processes one document at a time; record classes run
/// independently over the same chunk sequence.
pub struct Engine<O: Oracle> {
    oracle: O,
    config: EngineConfig,
    output_dir: PathBuf,
    ledger: Ledger,
}

impl<O: Oracle> Engine<O>
where
    O::Error: fmt::Display,
{
    /// Create an engine; fails on invalid configuration
    pub fn new(
        oracle: O,
        config: EngineConfig,
        output_dir: impl Into<PathBuf>,
        ledger_root: impl Into<PathBuf>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let ledger = Ledger::new(ledger_root, config.context_items_limit);
        Ok(Self {
            oracle,
            config,
            output_dir: output_dir.into(),
            ledger,
        })
    }

    /// Run extraction for every given class over one document
    pub fn run(
        &self,
        document: &str,
        schemas: &[RecordSchema],
    ) -> Result<Vec<ClassRunReport>, EngineError> {
        let mut reports = Vec::with_capacity(schemas.len());
        for schema in schemas {
            reports.push(self.run_class(document, schema)?);
        }
        Ok(reports)
    }

    /// Run extraction for one record class over one document
    ///
    /// Chunks are processed strictly in order. Record-level failures
    /// (verification, duplicates) and oracle protocol failures never abort
    /// the run; configuration and persistence failures do.
    pub fn run_class(
        &self,
        document: &str,
        schema: &RecordSchema,
    ) -> Result<ClassRunReport, EngineError> {
        let counter = HeuristicCounter;
        let document = SourceDocument::new(document);
        let total_tokens = counter.count(document.text());
        if total_tokens > self.config.document_token_limit {
            return Err(EngineError::DocumentTooLarge {
                tokens: total_tokens,
                limit: self.config.document_token_limit,
            });
        }

        let chunks = chunk_document(&document, &self.config.chunker, &counter)?;
        info!(
            class = schema.name.as_str(),
            chunks = chunks.len(),
            tokens = total_tokens,
            "starting extraction"
        );

        let store = OutputStore::new(&self.output_dir, &schema.name);
        let mut stored = store.load()?;

        // Seed identity state from prior-run output so resumed runs stay
        // idempotent.
        let mut identity = IdentityEngine::new(schema);
        for record in &stored {
            identity.register_stored(record, schema);
        }

        let mut report = ClassRunReport::new(&schema.name);
        report.chunk_count = chunks.len();

        for chunk in &chunks {
            self.run_chunk(chunk, schema, &store, &mut stored, &mut identity, &mut report)?;
        }

        info!(
            class = schema.name.as_str(),
            accepted = report.accepted,
            duplicates = report.duplicates,
            rejected = report.rejected,
            "extraction complete"
        );
        Ok(report)
    }

    fn run_chunk(
        &self,
        chunk: &Chunk,
        schema: &RecordSchema,
        store: &OutputStore,
        stored: &mut Vec<Value>,
        identity: &mut IdentityEngine,
        report: &mut ClassRunReport,
    ) -> Result<(), EngineError> {
        let signatures: Vec<String> = chunk
            .table_signatures()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let context = self
            .ledger
            .load_context(&schema.name, chunk.index, &signatures)?;
        let context_block = Ledger::format_context(&context);

        let mut chunk_tables = TableItems::new();
        let mut placeholder_ordinal = 0usize;
        let mut finished = false;

        for round in 1..=self.config.max_rounds {
            let request = OracleRequest {
                schema: schema.clone(),
                stored_preview: self.stored_preview(stored),
                table_context: context_block.clone(),
                chunk_text: chunk.text.clone(),
                round,
            };

            let reply = match self.oracle.propose(&request) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(
                        class = schema.name.as_str(),
                        chunk = chunk.index,
                        round,
                        error = %e,
                        "oracle call failed, stopping this chunk"
                    );
                    report
                        .warnings
                        .push(format!("chunk {}: oracle failed: {}", chunk.index, e));
                    finished = true;
                    break;
                }
            };

            let mut accepted_this_round: Vec<Value> = Vec::new();
            for item in &reply.items {
                let verified = match verify_record(item, schema, &chunk.text) {
                    Ok(verified) => verified,
                    Err(reasons) => {
                        debug!(
                            class = schema.name.as_str(),
                            chunk = chunk.index,
                            reasons = ?reasons,
                            "candidate rejected"
                        );
                        report.rejected += 1;
                        continue;
                    }
                };

                // Provisional sentinel identity until admission assigns the
                // real one.
                let mut record = CanonicalRecord {
                    id: RecordId::from_uuid(placeholder_id(&schema.name, placeholder_ordinal)),
                    class: schema.name.clone(),
                    fields: verified.fields,
                    misc: verified.misc,
                };
                placeholder_ordinal += 1;

                let seed = record.canonical_seed(schema);
                match identity.admit(&seed, verified.supplied_id.as_deref()) {
                    Admission::Duplicate => {
                        report.duplicates += 1;
                        continue;
                    }
                    Admission::Accepted(id) => record.id = id,
                }

                let stored_value = record.to_stored(schema);
                stored.push(stored_value.clone());
                accepted_this_round.push(stored_value);
                report.accepted += 1;
            }

            if !accepted_this_round.is_empty() {
                store.persist(stored)?;

                if let Some(signature) =
                    attribute_table(&reply.source_notes, &signatures, chunk)
                {
                    chunk_tables
                        .entry(signature)
                        .or_default()
                        .extend(accepted_this_round);
                }
            }

            if reply.complete {
                finished = true;
                break;
            }
            if reply.items.is_empty() {
                debug!(
                    class = schema.name.as_str(),
                    chunk = chunk.index,
                    round,
                    "empty reply without completion signal, stopping this chunk"
                );
                finished = true;
                break;
            }
        }

        if !finished {
            warn!(
                class = schema.name.as_str(),
                chunk = chunk.index,
                max_rounds = self.config.max_rounds,
                "max rounds reached"
            );
            report
                .warnings
                .push(format!("chunk {}: max rounds reached", chunk.index));
        }

        self.ledger
            .write_entry(&schema.name, chunk.index, &chunk_tables)?;
        Ok(())
    }

    /// Bounded preview of the most recently stored records
    fn stored_preview(&self, stored: &[Value]) -> String {
        if stored.is_empty() || self.config.stored_preview_items == 0 {
            return "None.".to_string();
        }
        let start = stored.len().saturating_sub(self.config.stored_preview_items);
        stored[start..]
            .iter()
            .map(|record| format!("- {}", canonical_json(record)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Which table, if any, a round's accepted items belong to
///
/// An explicit `table_signature = <sig>` declaration in the oracle's
/// source notes wins, but only when that signature is actually present in
/// the chunk. Otherwise, a chunk containing exactly one table attributes
/// to it by inference.
fn attribute_table(
    source_notes: &Option<String>,
    signatures: &[String],
    chunk: &Chunk,
) -> Option<String> {
    if let Some(notes) = source_notes {
        if let Some(signature) = parse_table_signature(notes) {
            if signatures.contains(&signature) {
                return Some(signature);
            }
        }
    }
    if chunk.tables.len() == 1 {
        return Some(chunk.tables[0].signature.clone());
    }
    None
}
