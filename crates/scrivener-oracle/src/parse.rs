//! Parse raw oracle output into a reply

use crate::OracleError;
use scrivener_domain::OracleReply;
use serde_json::Value;

/// Parse raw oracle text into an `OracleReply`
///
/// Accepted shapes, after stripping any markdown code fence:
/// - a bare JSON array of candidate objects
/// - an object with `items` (array), optional `source_notes` (string), and
///   optional `complete` (bool)
/// - a bare object without those keys, treated as a single candidate
pub fn parse_reply(response: &str) -> Result<OracleReply, OracleError> {
    let json_str = extract_json(response)?;

    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| OracleError::InvalidReply(format!("JSON parse error: {}", e)))?;

    match value {
        Value::Array(items) => Ok(OracleReply {
            items,
            source_notes: None,
            complete: false,
        }),
        Value::Object(obj)
            if obj.contains_key("items") || obj.contains_key("complete") =>
        {
            let items = match obj.get("items") {
                Some(Value::Array(items)) => items.clone(),
                Some(other) => {
                    return Err(OracleError::InvalidReply(format!(
                        "'items' must be an array, got {}",
                        other
                    )))
                }
                None => Vec::new(),
            };
            let source_notes = obj
                .get("source_notes")
                .and_then(Value::as_str)
                .map(str::to_string);
            let complete = obj
                .get("complete")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(OracleReply {
                items,
                source_notes,
                complete,
            })
        }
        obj @ Value::Object(_) => Ok(OracleReply {
            items: vec![obj],
            source_notes: None,
            complete: false,
        }),
        other => Err(OracleError::InvalidReply(format!(
            "Expected JSON array or object, got {}",
            other
        ))),
    }
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, OracleError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(OracleError::InvalidReply("Empty code block".to_string()));
        }
        // Skip first line (```json or ```) and last line (```)
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
