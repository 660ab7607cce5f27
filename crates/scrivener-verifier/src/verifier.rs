//! All-or-nothing record verification

use crate::coerce::coerce_value;
use crate::normalize::quote_is_valid;
use scrivener_domain::{Evidence, FieldKind, RecordSchema};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

/// Whether a confidence score is acceptable
pub fn confidence_is_valid(confidence: f64) -> bool {
    confidence.is_finite() && (0.0..=1.0).contains(&confidence)
}

/// Reasons a candidate record was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The candidate is not a JSON object
    #[error("candidate is not a JSON object")]
    NotAnObject,

    /// A required field is absent or null
    #[error("missing required field '{field}'")]
    MissingField {
        /// Field name
        field: String,
    },

    /// A field not declared by the schema
    #[error("unknown field '{field}'")]
    UnknownField {
        /// Field name
        field: String,
    },

    /// An evidence field did not arrive as `{value, quote, confidence}`
    #[error("malformed evidence for '{field}': {message}")]
    MalformedEvidence {
        /// Field name
        field: String,
        /// What went wrong
        message: String,
    },

    /// Quote missing or empty
    #[error("empty quote for '{field}'")]
    EmptyQuote {
        /// Field name
        field: String,
    },

    /// Confidence outside [0.0, 1.0] or not a number
    #[error("invalid confidence {confidence} for '{field}'")]
    InvalidConfidence {
        /// Field name
        field: String,
        /// The reported confidence
        confidence: f64,
    },

    /// Quote not found in the source text
    #[error("quote not found in source for '{field}': {quote:?}")]
    QuoteNotFound {
        /// Field name
        field: String,
        /// The quote that failed containment
        quote: String,
    },

    /// Value could not be parsed into the declared scalar type
    #[error("cannot coerce '{field}': {message}")]
    CoercionFailed {
        /// Field name
        field: String,
        /// What went wrong
        message: String,
    },
}

/// The accepted form of a verified record
///
/// Identity assignment happens downstream; `supplied_id` carries whatever
/// the oracle put in the schema's identifier field, unvetted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedRecord {
    /// Field name to typed scalar (evidence values coerced, plain copied)
    pub fields: BTreeMap<String, Value>,

    /// Metadata map: oracle-supplied `misc` entries plus one
    /// `<field>_proof` per populated evidence field
    pub misc: BTreeMap<String, Value>,

    /// Raw identifier claimed by the oracle, if any
    pub supplied_id: Option<String>,
}

/// Verify one candidate record against a schema and its chunk's source text
///
/// All-or-nothing: any failing field rejects the whole record; no partial
/// acceptance. On success every evidence-required value is coerced per its
/// declared type, plain fields are copied verbatim, and a
/// `<field>_proof = {quote, confidence}` entry is attached for each
/// evidence field actually populated, including fields whose value is
/// null but whose quote and confidence are valid.
pub fn verify_record(
    candidate: &Value,
    schema: &RecordSchema,
    source_text: &str,
) -> Result<VerifiedRecord, Vec<RejectionReason>> {
    let obj = match candidate.as_object() {
        Some(obj) => obj,
        None => return Err(vec![RejectionReason::NotAnObject]),
    };

    let mut reasons = Vec::new();

    for key in obj.keys() {
        if key != &schema.id_field && key != "misc" && schema.field(key).is_none() {
            reasons.push(RejectionReason::UnknownField { field: key.clone() });
        }
    }

    let mut fields = BTreeMap::new();
    let mut proofs = BTreeMap::new();

    for spec in &schema.fields {
        let raw = obj.get(&spec.name).filter(|v| !v.is_null());
        let raw = match raw {
            Some(v) => v,
            None => {
                if !spec.optional {
                    reasons.push(RejectionReason::MissingField {
                        field: spec.name.clone(),
                    });
                }
                continue;
            }
        };

        match spec.kind {
            FieldKind::Plain => {
                fields.insert(spec.name.clone(), raw.clone());
            }
            FieldKind::Evidence(scalar) => {
                let evidence: Evidence<Value> = match serde_json::from_value(raw.clone()) {
                    Ok(ev) => ev,
                    Err(e) => {
                        reasons.push(RejectionReason::MalformedEvidence {
                            field: spec.name.clone(),
                            message: e.to_string(),
                        });
                        continue;
                    }
                };

                if evidence.quote.trim().is_empty() {
                    reasons.push(RejectionReason::EmptyQuote {
                        field: spec.name.clone(),
                    });
                    continue;
                }
                if !confidence_is_valid(evidence.confidence) {
                    reasons.push(RejectionReason::InvalidConfidence {
                        field: spec.name.clone(),
                        confidence: evidence.confidence,
                    });
                    continue;
                }
                if !quote_is_valid(&evidence.quote, source_text) {
                    warn!(
                        field = spec.name.as_str(),
                        quote = evidence.quote.as_str(),
                        "quote not found in source"
                    );
                    reasons.push(RejectionReason::QuoteNotFound {
                        field: spec.name.clone(),
                        quote: evidence.quote.clone(),
                    });
                    continue;
                }

                let coerced = match &evidence.value {
                    Some(value) if !value.is_null() => match coerce_value(value, scalar) {
                        Ok(v) => v,
                        Err(message) => {
                            reasons.push(RejectionReason::CoercionFailed {
                                field: spec.name.clone(),
                                message,
                            });
                            continue;
                        }
                    },
                    _ => Value::Null,
                };

                fields.insert(spec.name.clone(), coerced);
                proofs.insert(
                    format!("{}_proof", spec.name),
                    json!({
                        "quote": evidence.quote,
                        "confidence": evidence.confidence,
                    }),
                );
            }
        }
    }

    if !reasons.is_empty() {
        return Err(reasons);
    }

    // Merge proofs into any oracle-supplied misc object; non-object misc
    // values are replaced.
    let mut misc = BTreeMap::new();
    if let Some(Value::Object(existing)) = obj.get("misc") {
        for (k, v) in existing {
            misc.insert(k.clone(), v.clone());
        }
    }
    misc.extend(proofs);

    let supplied_id = obj
        .get(&schema.id_field)
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Ok(VerifiedRecord {
        fields,
        misc,
        supplied_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrivener_domain::{FieldSpec, ScalarType};

    const SOURCE: &str = "The city will reduce emissions by 80% by 2030, \
        against a 1990 baseline of 1,471,000 tCO2e. The plan is in progress.";

    fn schema() -> RecordSchema {
        RecordSchema::new("target", "targetId")
            .with_field(FieldSpec::plain("description"))
            .with_field(FieldSpec::evidence("targetYear", ScalarType::IntegerYear))
            .with_field(FieldSpec::evidence("targetValue", ScalarType::Decimal))
            .with_field(FieldSpec::evidence("baselineValue", ScalarType::Decimal).or_absent())
            .with_field(FieldSpec::evidence("status", ScalarType::Categorical).or_absent())
            .with_notes_field("notes")
    }

    fn valid_candidate() -> Value {
        json!({
            "description": "Emission reduction target",
            "targetYear": {"value": "2030", "quote": "by 2030", "confidence": 0.95},
            "targetValue": {"value": "80%", "quote": "by 80%", "confidence": 0.9},
            "baselineValue": {"value": "1,471,000", "quote": "1,471,000 tCO2e", "confidence": 0.85},
            "status": {"value": "in progress", "quote": "in progress", "confidence": 0.8}
        })
    }

    #[test]
    fn test_accepts_valid_record() {
        let verified = verify_record(&valid_candidate(), &schema(), SOURCE).unwrap();
        assert_eq!(verified.fields["targetYear"], json!(2030));
        assert_eq!(verified.fields["targetValue"], json!("80"));
        assert_eq!(verified.fields["baselineValue"], json!("1471000"));
        assert_eq!(verified.fields["status"], json!("in progress"));
        assert_eq!(verified.fields["description"], json!("Emission reduction target"));
        assert_eq!(verified.misc.len(), 4);
        assert_eq!(verified.misc["targetYear_proof"]["quote"], json!("by 2030"));
    }

    #[test]
    fn test_all_or_nothing_rejection() {
        // 2 of 3 evidence fields valid, 1 invalid: the whole record goes.
        let mut candidate = valid_candidate();
        candidate["targetValue"]["quote"] = json!("by 95%");
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert_eq!(reasons.len(), 1);
        assert!(matches!(
            &reasons[0],
            RejectionReason::QuoteNotFound { field, .. } if field == "targetValue"
        ));
    }

    #[test]
    fn test_multiple_reasons_collected() {
        let mut candidate = valid_candidate();
        candidate["targetValue"]["quote"] = json!("");
        candidate["targetYear"]["confidence"] = json!(1.5);
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let mut candidate = valid_candidate();
        candidate.as_object_mut().unwrap().remove("targetYear");
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert!(matches!(
            &reasons[0],
            RejectionReason::MissingField { field } if field == "targetYear"
        ));
    }

    #[test]
    fn test_optional_field_may_be_absent() {
        let mut candidate = valid_candidate();
        candidate.as_object_mut().unwrap().remove("status");
        candidate.as_object_mut().unwrap().remove("baselineValue");
        let verified = verify_record(&candidate, &schema(), SOURCE).unwrap();
        assert!(!verified.fields.contains_key("status"));
        assert!(!verified.misc.contains_key("status_proof"));
    }

    #[test]
    fn test_null_value_with_valid_proof_kept() {
        let mut candidate = valid_candidate();
        candidate["status"] = json!({
            "value": null,
            "quote": "The plan is in progress",
            "confidence": 0.7
        });
        let verified = verify_record(&candidate, &schema(), SOURCE).unwrap();
        assert_eq!(verified.fields["status"], Value::Null);
        assert!(verified.misc.contains_key("status_proof"));
    }

    #[test]
    fn test_bare_scalar_for_evidence_field_rejected() {
        let mut candidate = valid_candidate();
        candidate["targetYear"] = json!("2030");
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert!(matches!(
            &reasons[0],
            RejectionReason::MalformedEvidence { field, .. } if field == "targetYear"
        ));
    }

    #[test]
    fn test_coercion_failure_rejects_record() {
        let mut candidate = valid_candidate();
        candidate["targetYear"]["value"] = json!("someday");
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert!(matches!(
            &reasons[0],
            RejectionReason::CoercionFailed { field, .. } if field == "targetYear"
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut candidate = valid_candidate();
        candidate["surprise"] = json!("extra");
        let reasons = verify_record(&candidate, &schema(), SOURCE).unwrap_err();
        assert!(matches!(
            &reasons[0],
            RejectionReason::UnknownField { field } if field == "surprise"
        ));
    }

    #[test]
    fn test_id_and_misc_keys_allowed() {
        let mut candidate = valid_candidate();
        candidate["targetId"] = json!("6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        candidate["misc"] = json!({"pageHint": 12});
        let verified = verify_record(&candidate, &schema(), SOURCE).unwrap();
        assert_eq!(
            verified.supplied_id.as_deref(),
            Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
        );
        assert_eq!(verified.misc["pageHint"], json!(12));
        assert!(verified.misc.contains_key("targetYear_proof"));
    }

    #[test]
    fn test_non_object_candidate_rejected() {
        let reasons = verify_record(&json!(["a", "b"]), &schema(), SOURCE).unwrap_err();
        assert_eq!(reasons, vec![RejectionReason::NotAnObject]);
    }

    #[test]
    fn test_quote_matches_across_hyphen_break() {
        let source = "targets an emission-\nreduction of 80% by 2030 against 1990 levels of 1,471,000 tCO2e";
        let candidate = json!({
            "description": "d",
            "targetYear": {"value": "2030", "quote": "by 2030", "confidence": 0.9},
            "targetValue": {"value": "80%", "quote": "emission reduction of 80%", "confidence": 0.9}
        });
        let verified = verify_record(&candidate, &schema(), source).unwrap();
        assert_eq!(verified.fields["targetValue"], json!("80"));
    }
}
