//! Canonical records - the verified output of the reconciliation core

use crate::canonical::canonical_json;
use crate::schema::RecordSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a canonical record, UUIDv5-based
///
/// Identifiers are derived deterministically from record content by the
/// identity engine, so the same content always carries the same identifier
/// across runs. This type only holds and formats the value; derivation
/// lives in `scrivener-identity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Wrap an already-derived UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a RecordId from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use scrivener_domain::RecordId;
    ///
    /// let id = RecordId::from_string("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap();
    /// assert_eq!(id.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid record identifier: {}", e))
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof attached to one evidence-required field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Verbatim quote from the source document
    pub quote: String,

    /// Confidence score reported by the oracle
    pub confidence: f64,
}

/// A verified, typed, identified record
///
/// Created once per accepted oracle item and never mutated afterwards.
/// `fields` holds the flat map of field name to typed scalar; `misc` is the
/// side-channel metadata map carrying one `<field>_proof` entry per
/// populated evidence field (plus anything the oracle legitimately supplied
/// under `misc`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Deterministic primary identifier
    pub id: RecordId,

    /// Record class name
    pub class: String,

    /// Field name to typed scalar value
    pub fields: BTreeMap<String, Value>,

    /// Metadata map; proofs live here as `<field>_proof` entries
    pub misc: BTreeMap<String, Value>,
}

impl CanonicalRecord {
    /// The canonical seed: content fields only, key-sorted, compact
    ///
    /// The identifier field, notes fields, and `misc` are excluded so that
    /// two records with identical content but different identifiers or
    /// commentary serialize to the same seed.
    pub fn canonical_seed(&self, schema: &RecordSchema) -> String {
        let mut content = serde_json::Map::new();
        for (name, value) in &self.fields {
            if schema.is_content_field(name) {
                content.insert(name.clone(), value.clone());
            }
        }
        canonical_json(&Value::Object(content))
    }

    /// Shape persisted to the per-class output artifact
    ///
    /// Flat object: the identifier under the schema's id field name, every
    /// scalar field, and `misc` when non-empty.
    pub fn to_stored(&self, schema: &RecordSchema) -> Value {
        let mut out = serde_json::Map::new();
        out.insert(schema.id_field.clone(), Value::String(self.id.to_string()));
        for (name, value) in &self.fields {
            out.insert(name.clone(), value.clone());
        }
        if !self.misc.is_empty() {
            let misc: serde_json::Map<String, Value> = self
                .misc
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.insert("misc".to_string(), Value::Object(misc));
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, ScalarType};
    use serde_json::json;

    fn schema() -> RecordSchema {
        RecordSchema::new("emission", "emissionRecordId")
            .with_field(FieldSpec::evidence("year", ScalarType::IntegerYear))
            .with_field(FieldSpec::evidence("value", ScalarType::Decimal))
            .with_notes_field("notes")
    }

    fn record(id: &str) -> CanonicalRecord {
        let mut fields = BTreeMap::new();
        fields.insert("year".to_string(), json!(2019));
        fields.insert("value".to_string(), json!("1471000"));
        fields.insert("notes".to_string(), json!("from table 3"));
        let mut misc = BTreeMap::new();
        misc.insert(
            "year_proof".to_string(),
            json!({"quote": "in 2019", "confidence": 0.95}),
        );
        CanonicalRecord {
            id: RecordId::from_string(id).unwrap(),
            class: "emission".to_string(),
            fields,
            misc,
        }
    }

    #[test]
    fn test_canonical_seed_excludes_id_and_notes() {
        let schema = schema();
        let a = record("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        let mut b = record("6ba7b811-9dad-11d1-80b4-00c04fd430c8");
        b.fields
            .insert("notes".to_string(), json!("different commentary"));
        assert_eq!(a.canonical_seed(&schema), b.canonical_seed(&schema));
    }

    #[test]
    fn test_canonical_seed_sensitive_to_content() {
        let schema = schema();
        let a = record("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        let mut b = record("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        b.fields.insert("year".to_string(), json!(2020));
        assert_ne!(a.canonical_seed(&schema), b.canonical_seed(&schema));
    }

    #[test]
    fn test_to_stored_carries_id_fields_and_misc() {
        let schema = schema();
        let rec = record("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        let stored = rec.to_stored(&schema);
        assert_eq!(
            stored["emissionRecordId"],
            json!("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
        );
        assert_eq!(stored["year"], json!(2019));
        assert_eq!(stored["misc"]["year_proof"]["confidence"], json!(0.95));
    }

    #[test]
    fn test_to_stored_omits_empty_misc() {
        let schema = schema();
        let mut rec = record("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        rec.misc.clear();
        let stored = rec.to_stored(&schema);
        assert!(stored.get("misc").is_none());
    }
}
