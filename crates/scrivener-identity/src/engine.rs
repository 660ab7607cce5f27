//! Identity assignment and duplicate suppression

use crate::placeholder::is_placeholder;
use scrivener_domain::{canonical_json, RecordId, RecordSchema};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Namespace UUID for a record class's identifier field
///
/// Nested name-based derivation: the class name seeds an intermediate
/// namespace, the identifier field name seeds the final one. Two classes
/// that happen to share an identifier field name still get disjoint
/// identifier spaces.
pub fn class_namespace(class: &str, id_field: &str) -> Uuid {
    let class_ns = Uuid::new_v5(&Uuid::nil(), class.as_bytes());
    Uuid::new_v5(&class_ns, id_field.as_bytes())
}

/// Derive a deterministic identifier from a canonical seed
pub fn derive_id(namespace: &Uuid, seed: &str) -> Uuid {
    Uuid::new_v5(namespace, seed.as_bytes())
}

/// Hex digest of a canonical seed, used as the dedup key
pub fn content_hash(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Reconstruct the canonical seed from a previously persisted record
///
/// Stored records are flat objects; the seed covers content fields only,
/// so the identifier, notes fields, and the `misc` map are dropped before
/// serialization. Returns `None` when the stored value is not an object.
pub fn seed_from_stored(stored: &Value, schema: &RecordSchema) -> Option<String> {
    let obj = stored.as_object()?;
    let mut content = Map::new();
    for (key, value) in obj {
        if schema.is_content_field(key) {
            content.insert(key.clone(), value.clone());
        }
    }
    Some(canonical_json(&Value::Object(content)))
}

/// Outcome of submitting a record for admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The record is new; store it under this identifier
    Accepted(RecordId),
    /// Identical content was already seen; drop the record
    Duplicate,
}

/// Run-scoped identity and dedup state for one record class
///
/// Holds the set of content hashes already seen and the set of
/// identifiers already claimed. Both sets are seeded from prior-run
/// output via [`IdentityEngine::register_stored`] so resumed runs stay
/// idempotent.
///
/// # Examples
///
/// ```
/// use scrivener_identity::{Admission, IdentityEngine};
/// use scrivener_domain::catalog;
///
/// let schema = catalog::target();
/// let mut engine = IdentityEngine::new(&schema);
/// let seed = r#"{"description":"cut emissions","targetYear":2030}"#;
///
/// let first = engine.admit(seed, None);
/// assert!(matches!(first, Admission::Accepted(_)));
/// assert_eq!(engine.admit(seed, None), Admission::Duplicate);
/// ```
pub struct IdentityEngine {
    class: String,
    namespace: Uuid,
    seen: HashSet<String>,
    claimed: HashSet<Uuid>,
}

impl IdentityEngine {
    /// Create an empty engine for the given class schema
    pub fn new(schema: &RecordSchema) -> Self {
        Self {
            class: schema.name.clone(),
            namespace: class_namespace(&schema.name, &schema.id_field),
            seen: HashSet::new(),
            claimed: HashSet::new(),
        }
    }

    /// Seed the engine from a record persisted by a prior run
    ///
    /// Its content hash joins the seen set and its identifier, when
    /// parseable, joins the claimed set.
    pub fn register_stored(&mut self, stored: &Value, schema: &RecordSchema) {
        if let Some(seed) = seed_from_stored(stored, schema) {
            self.seen.insert(content_hash(&seed));
        }
        if let Some(id) = stored
            .get(&schema.id_field)
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
        {
            self.claimed.insert(id);
        }
    }

    /// Submit a record's canonical seed, with any oracle-supplied identifier
    ///
    /// Duplicate content is dropped. A supplied identifier is kept only
    /// when it parses as a UUID, is not the placeholder sentinel, and is
    /// unclaimed in this run; otherwise a deterministic identifier is
    /// derived from the seed, salting on collision until unique.
    pub fn admit(&mut self, seed: &str, supplied: Option<&str>) -> Admission {
        let digest = content_hash(seed);
        if !self.seen.insert(digest) {
            debug!(class = self.class.as_str(), "duplicate record dropped");
            return Admission::Duplicate;
        }

        let id = match supplied.and_then(|s| Uuid::parse_str(s).ok()) {
            Some(id) if !is_placeholder(&id) && !self.claimed.contains(&id) => id,
            _ => self.derive_unique(seed),
        };
        self.claimed.insert(id);
        Admission::Accepted(RecordId::from_uuid(id))
    }

    fn derive_unique(&self, seed: &str) -> Uuid {
        let mut candidate = derive_id(&self.namespace, seed);
        let mut salt = 0u32;
        while self.claimed.contains(&candidate) {
            salt += 1;
            candidate = derive_id(&self.namespace, &format!("{seed}|{salt}"));
        }
        if salt > 0 {
            debug!(
                class = self.class.as_str(),
                salt, "identifier collision resolved by salting"
            );
        }
        candidate
    }

    /// Number of distinct records seen so far, prior-run seeds included
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{catalog, FieldSpec, ScalarType};
    use serde_json::json;

    fn schema() -> RecordSchema {
        RecordSchema::new("target", "targetId")
            .with_field(FieldSpec::plain("description"))
            .with_field(FieldSpec::evidence("targetYear", ScalarType::IntegerYear))
            .with_notes_field("notes")
    }

    #[test]
    fn test_same_seed_same_identifier_across_engines() {
        let schema = schema();
        let seed = r#"{"description":"cut emissions","targetYear":2030}"#;
        let a = IdentityEngine::new(&schema).admit(seed, None);
        let b = IdentityEngine::new(&schema).admit(seed, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_classes_have_disjoint_identifier_spaces() {
        let seed = r#"{"value":100,"year":2020}"#;
        let a = IdentityEngine::new(&catalog::target()).admit(seed, None);
        let b = IdentityEngine::new(&catalog::emission()).admit(seed, None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_duplicate_content_dropped() {
        let mut engine = IdentityEngine::new(&schema());
        let seed = r#"{"description":"cut emissions","targetYear":2030}"#;
        assert!(matches!(engine.admit(seed, None), Admission::Accepted(_)));
        // Different supplied identifier, same content.
        assert_eq!(
            engine.admit(seed, Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8")),
            Admission::Duplicate
        );
    }

    #[test]
    fn test_valid_supplied_identifier_kept() {
        let mut engine = IdentityEngine::new(&schema());
        let supplied = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        match engine.admit(r#"{"targetYear":2030}"#, Some(supplied)) {
            Admission::Accepted(id) => assert_eq!(id.to_string(), supplied),
            Admission::Duplicate => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_placeholder_supplied_identifier_replaced() {
        let mut engine = IdentityEngine::new(&schema());
        let sentinel = crate::placeholder_id("target", 0).to_string();
        match engine.admit(r#"{"targetYear":2030}"#, Some(&sentinel)) {
            Admission::Accepted(id) => assert_ne!(id.to_string(), sentinel),
            Admission::Duplicate => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_claimed_supplied_identifier_replaced() {
        let mut engine = IdentityEngine::new(&schema());
        let supplied = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
        let first = engine.admit(r#"{"targetYear":2030}"#, Some(supplied));
        let second = engine.admit(r#"{"targetYear":2050}"#, Some(supplied));
        match (first, second) {
            (Admission::Accepted(a), Admission::Accepted(b)) => {
                assert_eq!(a.to_string(), supplied);
                assert_ne!(b.to_string(), supplied);
            }
            _ => panic!("expected two acceptances"),
        }
    }

    #[test]
    fn test_invalid_supplied_identifier_replaced_deterministically() {
        let schema = schema();
        let seed = r#"{"targetYear":2030}"#;
        let expected = derive_id(&class_namespace("target", "targetId"), seed);
        let mut engine = IdentityEngine::new(&schema);
        match engine.admit(seed, Some("not-a-uuid")) {
            Admission::Accepted(id) => assert_eq!(id.as_uuid(), expected),
            Admission::Duplicate => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_collision_resolved_by_salting() {
        let schema = schema();
        let seed = r#"{"targetYear":2030}"#;
        let derived = derive_id(&class_namespace("target", "targetId"), seed);

        let mut engine = IdentityEngine::new(&schema);
        // A prior-run record already claims the identifier this seed derives.
        engine.register_stored(
            &json!({"targetId": derived.to_string(), "description": "other"}),
            &schema,
        );
        match engine.admit(seed, None) {
            Admission::Accepted(id) => {
                assert_ne!(id.as_uuid(), derived);
                let salted = derive_id(&class_namespace("target", "targetId"), &format!("{seed}|1"));
                assert_eq!(id.as_uuid(), salted);
            }
            Admission::Duplicate => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_register_stored_seeds_dedup() {
        let schema = schema();
        let mut engine = IdentityEngine::new(&schema);
        engine.register_stored(
            &json!({
                "targetId": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
                "description": "cut emissions",
                "targetYear": 2030,
                "notes": "ignored",
                "misc": {"targetYear_proof": {"quote": "q", "confidence": 0.9}}
            }),
            &schema,
        );
        // Same content, notes and misc differ: still a duplicate.
        let seed = canonical_json(&json!({
            "description": "cut emissions",
            "targetYear": 2030
        }));
        assert_eq!(engine.admit(&seed, None), Admission::Duplicate);
        assert_eq!(engine.seen_count(), 1);
    }
}
