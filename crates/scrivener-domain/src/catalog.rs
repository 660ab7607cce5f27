//! Builtin record class catalog
//!
//! The standard classes extracted from climate action plan documents. The
//! schema marks several columns as categorical but the allowed vocabularies
//! are not finalized, so those stay plain strings for now.

use crate::schema::{FieldSpec, RecordSchema, ScalarType};

/// Schema for emission-reduction targets
pub fn target() -> RecordSchema {
    RecordSchema::new("target", "targetId")
        .with_field(FieldSpec::plain("cityId").or_absent())
        .with_field(FieldSpec::plain("indicatorId").or_absent())
        .with_field(FieldSpec::plain("description"))
        .with_field(FieldSpec::evidence("targetYear", ScalarType::IntegerYear))
        .with_field(FieldSpec::evidence("targetValue", ScalarType::Decimal))
        .with_field(FieldSpec::evidence("baselineYear", ScalarType::IntegerYear).or_absent())
        .with_field(FieldSpec::evidence("baselineValue", ScalarType::Decimal).or_absent())
        .with_field(FieldSpec::evidence("status", ScalarType::Categorical).or_absent())
        .with_notes_field("notes")
}

/// Schema for yearly greenhouse-gas emission records
pub fn emission() -> RecordSchema {
    RecordSchema::new("emission", "emissionRecordId")
        .with_field(FieldSpec::plain("cityId").or_absent())
        .with_field(FieldSpec::evidence("year", ScalarType::IntegerYear))
        .with_field(FieldSpec::plain("sectorId").or_absent())
        .with_field(FieldSpec::plain("scope"))
        .with_field(FieldSpec::plain("ghgType"))
        .with_field(FieldSpec::evidence("value", ScalarType::Decimal))
        .with_field(FieldSpec::plain("unit"))
        .with_notes_field("notes")
}

/// Schema for yearly municipal budgets
pub fn budget() -> RecordSchema {
    RecordSchema::new("budget", "budgetId")
        .with_field(FieldSpec::plain("cityId").or_absent())
        .with_field(FieldSpec::evidence("year", ScalarType::IntegerYear))
        .with_field(FieldSpec::evidence("totalAmount", ScalarType::Decimal))
        .with_field(FieldSpec::plain("currency"))
        .with_notes_field("notes")
}

/// Schema for indicator measurements
pub fn indicator_value() -> RecordSchema {
    RecordSchema::new("indicator_value", "indicatorValueId")
        .with_field(FieldSpec::plain("indicatorId").or_absent())
        .with_field(FieldSpec::evidence("year", ScalarType::IntegerYear))
        .with_field(FieldSpec::evidence("value", ScalarType::Decimal))
        .with_field(FieldSpec::plain("unit").or_absent())
        .with_notes_field("notes")
}

/// Schema for budget funding lines
pub fn budget_funding() -> RecordSchema {
    RecordSchema::new("budget_funding", "budgetFundingId")
        .with_field(FieldSpec::plain("budgetId").or_absent())
        .with_field(FieldSpec::plain("source"))
        .with_field(FieldSpec::evidence("amount", ScalarType::Decimal))
        .with_notes_field("notes")
}

/// Schema for climate initiatives
pub fn initiative() -> RecordSchema {
    RecordSchema::new("initiative", "initiativeId")
        .with_field(FieldSpec::plain("cityId").or_absent())
        .with_field(FieldSpec::plain("name"))
        .with_field(FieldSpec::plain("description").or_absent())
        .with_field(FieldSpec::evidence("startYear", ScalarType::IntegerYear).or_absent())
        .with_field(FieldSpec::evidence("endYear", ScalarType::IntegerYear).or_absent())
        .with_field(FieldSpec::evidence("totalEstimatedCost", ScalarType::Decimal).or_absent())
        .with_field(FieldSpec::evidence("status", ScalarType::Categorical).or_absent())
        .with_notes_field("notes")
}

/// All builtin classes, sorted by class name
pub fn all_classes() -> Vec<RecordSchema> {
    let mut classes = vec![
        target(),
        emission(),
        budget(),
        indicator_value(),
        budget_funding(),
        initiative(),
    ];
    classes.sort_by(|a, b| a.name.cmp(&b.name));
    classes
}
