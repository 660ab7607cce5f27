//! Prompt assembly for extraction requests

use scrivener_domain::OracleRequest;

/// Build the full prompt text for one extraction round
pub fn build_prompt(request: &OracleRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str(EXTRACTION_INSTRUCTIONS);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Record class: {}\n", request.schema.name));
    prompt.push_str("Fields:\n");
    prompt.push_str(&request.schema.describe_fields());
    prompt.push_str("\n\n");

    prompt.push_str(&format!("Extraction round: {}\n\n", request.round));

    prompt.push_str("Already stored records (do not repeat these):\n");
    prompt.push_str(&request.stored_preview);
    prompt.push_str("\n\n");

    prompt.push_str("Rows already extracted from tables continuing in this chunk:\n");
    prompt.push_str(&request.table_context);
    prompt.push_str("\n\n");

    prompt.push_str("Text to analyze:\n---\n");
    prompt.push_str(&request.chunk_text);
    prompt.push_str("\n---\n\n");

    prompt.push_str(OUTPUT_FORMAT_REMINDER);

    prompt
}

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract structured records of the given class from the following text.
Every evidence-required field must be reported as:

{
  "value": <the claimed value, or null if stated but unreadable>,
  "quote": "exact text from the source supporting the value",
  "confidence": 0.0-1.0
}

Rules:
- Only report records actually present in the text; never invent values
- Quotes must be verbatim spans of the source text
- Use lower confidence for hedged or approximate statements
- When a record comes from a table, note which table in "source_notes"
  using the form: table_signature = <signature>
- When no further records remain, reply with {"complete": true}"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON only, no additional text):
{
  "items": [ { ...one object per record, using the field names above... } ],
  "source_notes": "optional free text, may carry table_signature = <sig>",
  "complete": false
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
