//! Deterministic JSON serialization
//!
//! Identity derivation, deduplication, and ledger item dedup all compare
//! records by a serialized form, so that form has to be byte-stable: object
//! keys sorted recursively, compact separators, no float re-formatting
//! surprises (values pass through `serde_json`'s own rendering).

use serde_json::Value;
use std::collections::BTreeMap;

/// Serialize a JSON value with all object keys sorted, recursively
///
/// # Examples
///
/// ```
/// use scrivener_domain::canonical_json;
/// use serde_json::json;
///
/// let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
/// let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
/// assert_eq!(canonical_json(&a), canonical_json(&b));
/// ```
pub fn canonical_json(value: &Value) -> String {
    sorted(value).to_string()
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), sorted(v)))
                .collect();
            let mut out = serde_json::Map::with_capacity(ordered.len());
            for (k, v) in ordered {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
