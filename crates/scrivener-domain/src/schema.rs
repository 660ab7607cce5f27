//! Record class schemas

use serde::{Deserialize, Serialize};

/// Target scalar type for an evidence-required field
///
/// The oracle supplies free-form values (usually strings); the verifier
/// coerces them into one of these shapes before a record is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// A 4-digit calendar year stored as an integer
    IntegerYear,
    /// A canonical decimal string (thousands separators resolved)
    Decimal,
    /// A categorical string; no coercion beyond stringification
    Categorical,
}

/// Whether a field is passed through or requires evidence backing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Copied verbatim from the oracle reply
    Plain,
    /// Must arrive as `{value, quote, confidence}` and pass verification
    Evidence(ScalarType),
}

/// A single field of a record class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in oracle replies and persisted output
    pub name: String,

    /// Plain or evidence-required
    pub kind: FieldKind,

    /// Whether the field may be absent from a candidate record
    pub optional: bool,
}

impl FieldSpec {
    /// A required plain field
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Plain,
            optional: false,
        }
    }

    /// A required evidence field with the given target type
    pub fn evidence(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Evidence(scalar),
            optional: false,
        }
    }

    /// Mark the field optional
    pub fn or_absent(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// A named record class with a fixed set of fields
///
/// The schema also names its identifier field and its free-text notes
/// fields; both are excluded from the canonical seed so that identity and
/// deduplication depend only on record content.
///
/// # Examples
///
/// ```
/// use scrivener_domain::{FieldSpec, RecordSchema, ScalarType};
///
/// let schema = RecordSchema::new("emission", "emissionRecordId")
///     .with_field(FieldSpec::evidence("year", ScalarType::IntegerYear))
///     .with_field(FieldSpec::evidence("value", ScalarType::Decimal))
///     .with_field(FieldSpec::plain("unit"))
///     .with_notes_field("notes");
///
/// assert_eq!(schema.evidence_fields().count(), 2);
/// assert!(schema.is_content_field("unit"));
/// assert!(!schema.is_content_field("notes"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Record class name (e.g. "target", "emission")
    pub name: String,

    /// Name of the primary identifier field
    pub id_field: String,

    /// Free-text fields excluded from the canonical seed
    pub notes_fields: Vec<String>,

    /// Ordered field set
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Create an empty schema for the given class and identifier field
    pub fn new(name: impl Into<String>, id_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            notes_fields: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Register a notes field (also added as an optional plain field)
    pub fn with_notes_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.fields.push(FieldSpec::plain(name.clone()).or_absent());
        self.notes_fields.push(name);
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate over evidence-required fields with their target types
    pub fn evidence_fields(&self) -> impl Iterator<Item = (&FieldSpec, ScalarType)> {
        self.fields.iter().filter_map(|f| match f.kind {
            FieldKind::Evidence(scalar) => Some((f, scalar)),
            FieldKind::Plain => None,
        })
    }

    /// Whether a field participates in the canonical seed
    ///
    /// The identifier field, notes fields, and the `misc` metadata map are
    /// excluded; everything else is record content.
    pub fn is_content_field(&self, name: &str) -> bool {
        name != self.id_field && name != "misc" && !self.notes_fields.iter().any(|n| n == name)
    }

    /// One-line summary of a field for oracle requests
    ///
    /// Evidence fields are flagged with their target type so the oracle
    /// knows to reply with `{value, quote, confidence}`.
    pub fn describe_fields(&self) -> String {
        let mut lines = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let requirement = if field.optional { "optional" } else { "required" };
            let line = match field.kind {
                FieldKind::Plain => format!("- {} ({}, plain)", field.name, requirement),
                FieldKind::Evidence(scalar) => {
                    let scalar_name = match scalar {
                        ScalarType::IntegerYear => "integer year",
                        ScalarType::Decimal => "decimal",
                        ScalarType::Categorical => "categorical string",
                    };
                    format!(
                        "- {} ({}, evidence-required, {})",
                        field.name, requirement, scalar_name
                    )
                }
            };
            lines.push(line);
        }
        lines.join("\n")
    }
}
