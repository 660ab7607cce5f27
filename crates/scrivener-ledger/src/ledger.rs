//! Append-only per-chunk ledger files

use crate::error::LedgerError;
use regex::Regex;
use scrivener_domain::canonical_json;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::{debug, warn};

static CHUNK_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chunk_(\d+)\.json$").unwrap());

static TABLE_SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"table_signature\s*=\s*([A-Za-z0-9_-]+)").unwrap());

/// Table signature to accepted items, as stored per chunk
pub type TableItems = BTreeMap<String, Vec<Value>>;

/// Extract a `table_signature = <sig>` declaration from oracle source notes
pub fn parse_table_signature(source_notes: &str) -> Option<String> {
    TABLE_SIGNATURE_RE
        .captures(source_notes)
        .map(|caps| caps[1].to_string())
}

/// Filesystem-backed table context store
///
/// One file per `(record class, chunk index)` under
/// `<root>/<class>/chunk_NNNN.json`, each holding the signature-to-items
/// map for that chunk. The index is encoded in the file name so ordering
/// is recoverable by listing the directory.
///
/// The ledger is append-only within a run: a chunk's entry is written
/// exactly once, after the chunk completes, and reads always exclude the
/// reading chunk's own index.
pub struct Ledger {
    root: PathBuf,
    max_items: usize,
}

impl Ledger {
    /// Create a ledger rooted at the given directory
    ///
    /// `max_items` bounds how many items are kept per signature, both on
    /// write and when assembling context; zero means unbounded.
    pub fn new(root: impl Into<PathBuf>, max_items: usize) -> Self {
        Self {
            root: root.into(),
            max_items,
        }
    }

    /// Persist the accepted table items for one completed chunk
    ///
    /// Writes to a dot-prefixed temp file and renames it into place, so a
    /// reader never observes a partial entry. Empty signature lists are
    /// dropped; when nothing remains, no file is written.
    pub fn write_entry(
        &self,
        class: &str,
        chunk_index: usize,
        tables: &TableItems,
    ) -> Result<(), LedgerError> {
        let limited = self.limit(tables);
        if limited.is_empty() {
            return Ok(());
        }

        let class_dir = self.root.join(class);
        fs::create_dir_all(&class_dir).map_err(|e| LedgerError::io(&class_dir, e))?;

        let payload = json!({
            "chunk_index": chunk_index,
            "tables": limited,
        });
        let body = serde_json::to_string_pretty(&payload)?;

        let tmp_path = class_dir.join(format!(".chunk_{chunk_index:04}.json.tmp"));
        let final_path = class_dir.join(format!("chunk_{chunk_index:04}.json"));
        fs::write(&tmp_path, body).map_err(|e| LedgerError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &final_path).map_err(|e| LedgerError::io(&final_path, e))?;

        debug!(
            class,
            chunk_index,
            signatures = limited.len(),
            "ledger entry written"
        );
        Ok(())
    }

    /// Collect prior context for a chunk about to run
    ///
    /// Reads every entry with chunk index strictly below `chunk_index`,
    /// keeps only the requested signatures, deduplicates items by
    /// canonical content, and bounds each list to the most recent
    /// `max_items`. Unreadable entry files are skipped with a warning.
    pub fn load_context(
        &self,
        class: &str,
        chunk_index: usize,
        signatures: &[String],
    ) -> Result<TableItems, LedgerError> {
        if signatures.is_empty() {
            return Ok(TableItems::new());
        }
        let class_dir = self.root.join(class);
        if !class_dir.is_dir() {
            return Ok(TableItems::new());
        }

        let mut entries: Vec<(usize, PathBuf)> = Vec::new();
        let listing = fs::read_dir(&class_dir).map_err(|e| LedgerError::io(&class_dir, e))?;
        for entry in listing {
            let entry = entry.map_err(|e| LedgerError::io(&class_dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(caps) = CHUNK_FILE_RE.captures(name) else {
                continue;
            };
            let Ok(index) = caps[1].parse::<usize>() else {
                continue;
            };
            if index < chunk_index {
                entries.push((index, entry.path()));
            }
        }
        entries.sort();

        let wanted: HashSet<&str> = signatures.iter().map(String::as_str).collect();
        let mut collected = TableItems::new();
        let mut seen: BTreeMap<String, HashSet<String>> = BTreeMap::new();

        for (_, path) in entries {
            let payload = match read_entry(&path) {
                Some(payload) => payload,
                None => continue,
            };
            let Some(tables) = payload.get("tables").and_then(Value::as_object) else {
                continue;
            };
            for (sig, items) in tables {
                if !wanted.contains(sig.as_str()) {
                    continue;
                }
                let Some(items) = items.as_array() else {
                    continue;
                };
                let seen_for_sig = seen.entry(sig.clone()).or_default();
                for item in items {
                    let key = canonical_json(item);
                    if seen_for_sig.insert(key) {
                        collected.entry(sig.clone()).or_default().push(item.clone());
                    }
                }
            }
        }

        Ok(self.limit(&collected))
    }

    /// Render a context map into the text block supplied to the oracle
    ///
    /// Each signature gets a `table_signature = <sig>` header followed by
    /// one compact JSON item per line, so the oracle can echo the same
    /// declaration back in its source notes. An empty map renders as
    /// `"None."`.
    pub fn format_context(context: &TableItems) -> String {
        if context.values().all(Vec::is_empty) {
            return "None.".to_string();
        }
        let mut lines = Vec::new();
        for (sig, items) in context {
            if items.is_empty() {
                continue;
            }
            lines.push(format!("table_signature = {sig}"));
            for item in items {
                lines.push(format!("- {}", canonical_json(item)));
            }
        }
        lines.join("\n")
    }

    /// Keep the most recent `max_items` per signature, dropping empty lists
    fn limit(&self, tables: &TableItems) -> TableItems {
        let mut limited = TableItems::new();
        for (sig, items) in tables {
            if items.is_empty() {
                continue;
            }
            let kept = if self.max_items > 0 && items.len() > self.max_items {
                items[items.len() - self.max_items..].to_vec()
            } else {
                items.clone()
            };
            limited.insert(sig.clone(), kept);
        }
        limited
    }
}

fn read_entry(path: &PathBuf) -> Option<Value> {
    let body = match fs::read_to_string(path) {
        Ok(body) => body,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable ledger entry");
            return None;
        }
    };
    match serde_json::from_str::<Value>(&body) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => {
            warn!(path = %path.display(), "skipping non-object ledger entry");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping corrupt ledger entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn items(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| json!({"value": v})).collect()
    }

    #[test]
    fn test_parse_table_signature() {
        assert_eq!(
            parse_table_signature("rows from table_signature = abc123DEF-_x"),
            Some("abc123DEF-_x".to_string())
        );
        assert_eq!(
            parse_table_signature("table_signature=deadbeef"),
            Some("deadbeef".to_string())
        );
        assert_eq!(parse_table_signature("no declaration here"), None);
        assert_eq!(parse_table_signature(""), None);
    }

    #[test]
    fn test_write_then_load_from_later_chunk() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["row1", "row2"]));
        ledger.write_entry("emission", 0, &tables).unwrap();

        let context = ledger
            .load_context("emission", 1, &["sig-a".to_string()])
            .unwrap();
        assert_eq!(context["sig-a"], items(&["row1", "row2"]));

        assert!(dir.path().join("emission/chunk_0000.json").is_file());
    }

    #[test]
    fn test_chunk_never_reads_its_own_entry() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["row1"]));
        ledger.write_entry("emission", 2, &tables).unwrap();

        let context = ledger
            .load_context("emission", 2, &["sig-a".to_string()])
            .unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn test_signature_filter() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["a"]));
        tables.insert("sig-b".to_string(), items(&["b"]));
        ledger.write_entry("target", 0, &tables).unwrap();

        let context = ledger
            .load_context("target", 1, &["sig-b".to_string()])
            .unwrap();
        assert!(!context.contains_key("sig-a"));
        assert_eq!(context["sig-b"], items(&["b"]));
    }

    #[test]
    fn test_items_deduplicated_across_chunks() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut first = TableItems::new();
        first.insert("sig-a".to_string(), items(&["row1", "row2"]));
        ledger.write_entry("target", 0, &first).unwrap();

        let mut second = TableItems::new();
        second.insert("sig-a".to_string(), items(&["row2", "row3"]));
        ledger.write_entry("target", 1, &second).unwrap();

        let context = ledger
            .load_context("target", 2, &["sig-a".to_string()])
            .unwrap();
        assert_eq!(context["sig-a"], items(&["row1", "row2", "row3"]));
    }

    #[test]
    fn test_context_capped_to_most_recent() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 2);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["r1"]));
        ledger.write_entry("target", 0, &tables).unwrap();
        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["r2"]));
        ledger.write_entry("target", 1, &tables).unwrap();
        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["r3"]));
        ledger.write_entry("target", 2, &tables).unwrap();

        let context = ledger
            .load_context("target", 3, &["sig-a".to_string()])
            .unwrap();
        assert_eq!(context["sig-a"], items(&["r2", "r3"]));
    }

    #[test]
    fn test_write_caps_per_signature() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 2);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["r1", "r2", "r3"]));
        ledger.write_entry("target", 0, &tables).unwrap();

        let context = ledger
            .load_context("target", 1, &["sig-a".to_string()])
            .unwrap();
        assert_eq!(context["sig-a"], items(&["r2", "r3"]));
    }

    #[test]
    fn test_empty_tables_write_nothing() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), Vec::new());
        ledger.write_entry("target", 0, &tables).unwrap();

        assert!(!dir.path().join("target").exists());
    }

    #[test]
    fn test_missing_class_dir_yields_empty_context() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);
        let context = ledger
            .load_context("budget", 5, &["sig-a".to_string()])
            .unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn test_no_signatures_yields_empty_context() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);
        let context = ledger.load_context("budget", 5, &[]).unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn test_corrupt_entry_skipped() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::new(dir.path(), 10);

        let mut tables = TableItems::new();
        tables.insert("sig-a".to_string(), items(&["good"]));
        ledger.write_entry("target", 0, &tables).unwrap();

        fs::write(dir.path().join("target/chunk_0001.json"), "{not json").unwrap();

        let context = ledger
            .load_context("target", 2, &["sig-a".to_string()])
            .unwrap();
        assert_eq!(context["sig-a"], items(&["good"]));
    }

    #[test]
    fn test_format_context() {
        let mut context = TableItems::new();
        context.insert("abc123".to_string(), items(&["r1", "r2"]));
        let block = Ledger::format_context(&context);
        assert!(block.starts_with("table_signature = abc123"));
        assert!(block.contains(r#"- {"value":"r1"}"#));
        assert!(block.contains(r#"- {"value":"r2"}"#));

        assert_eq!(Ledger::format_context(&TableItems::new()), "None.");
    }
}
