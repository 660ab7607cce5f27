//! Scalar coercion of oracle-supplied values

use regex::Regex;
use scrivener_domain::ScalarType;
use serde_json::Value;
use std::sync::LazyLock;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(19|20)\d{2}").unwrap());
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:[.,]\d+)*").unwrap());

/// Coerce a claimed value into its declared scalar type
///
/// The oracle supplies free-form values (usually strings); this converts
/// them into the typed shape persisted downstream. Fails with a message
/// when the value cannot be read as the target type.
///
/// # Examples
///
/// ```
/// use scrivener_verifier::coerce_value;
/// use scrivener_domain::ScalarType;
/// use serde_json::json;
///
/// assert_eq!(
///     coerce_value(&json!("1,471,000"), ScalarType::Decimal).unwrap(),
///     json!("1471000")
/// );
/// assert_eq!(
///     coerce_value(&json!("by 2030"), ScalarType::IntegerYear).unwrap(),
///     json!(2030)
/// );
/// ```
pub fn coerce_value(value: &Value, target: ScalarType) -> Result<Value, String> {
    match target {
        ScalarType::IntegerYear => coerce_year(value).map(Value::from),
        ScalarType::Decimal => coerce_decimal(value).map(Value::String),
        ScalarType::Categorical => Ok(Value::String(stringify(value))),
    }
}

fn coerce_year(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f as i64)
            } else {
                Err(format!("Cannot coerce {} to year", n))
            }
        }
        Value::String(s) => {
            let m = YEAR_RE
                .find(s)
                .ok_or_else(|| format!("No 4-digit year found in {:?}", s))?;
            m.as_str()
                .parse::<i64>()
                .map_err(|e| format!("Year parse failed for {:?}: {}", s, e))
        }
        other => Err(format!("Cannot coerce {} to year", type_name(other))),
    }
}

fn coerce_decimal(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => normalize_decimal_string(s),
        Value::Number(n) => normalize_decimal_string(&n.to_string()),
        other => Err(format!("Cannot coerce {} to decimal", type_name(other))),
    }
}

/// Extract and normalize the first numeric token into a canonical decimal
///
/// A value containing both commas and periods treats commas as thousands
/// separators. With commas only, a comma is a thousands separator when the
/// trailing group has exactly 3 digits, otherwise a decimal separator.
/// Values like "12,345" are therefore read as thousands-grouped even when
/// a two-decimal-place amount was meant; that imprecision is inherited and
/// kept deliberately.
fn normalize_decimal_string(raw: &str) -> Result<String, String> {
    let m = NUMBER_RE
        .find(raw)
        .ok_or_else(|| format!("No numeric value found in {:?}", raw))?;
    let mut number = m.as_str().to_string();

    if number.contains(',') && number.contains('.') {
        number = number.replace(',', "");
    } else if number.contains(',') {
        let trailing = number.rsplit(',').next().unwrap_or("");
        if trailing.len() == 3 {
            number = number.replace(',', "");
        } else {
            number = number.replace(',', ".");
        }
    }

    if number.parse::<f64>().is_err() {
        return Err(format!("Not a decimal: {:?}", raw));
    }
    Ok(canonicalize_decimal(&number))
}

/// Trim redundant leading zeros from the integer part, keeping the sign
fn canonicalize_decimal(number: &str) -> String {
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let trimmed = int_part.trim_start_matches('0');
    let int_part = if trimmed.is_empty() { "0" } else { trimmed };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, int_part, frac),
        None => format!("{}{}", sign, int_part),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
