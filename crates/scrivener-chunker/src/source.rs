//! Immutable source document with a derived line index

/// A loaded document plus a precomputed line index
///
/// The index is derived once at construction, so block parsing and line
/// reporting never rescan the text. The document never changes after
/// loading.
///
/// # Examples
///
/// ```
/// use scrivener_chunker::SourceDocument;
///
/// let doc = SourceDocument::new("alpha\nbeta\n");
/// assert_eq!(doc.line_count(), 2);
/// assert_eq!(doc.line(2), Some("beta"));
/// ```
#[derive(Debug, Clone)]
pub struct SourceDocument {
    text: String,
    line_spans: Vec<(usize, usize)>,
}

impl SourceDocument {
    /// Load a document and index its lines
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let bytes = text.as_bytes();
        let mut line_spans = Vec::new();
        let mut start = 0usize;
        for (idx, byte) in bytes.iter().enumerate() {
            if *byte == b'\n' {
                let end = if idx > start && bytes[idx - 1] == b'\r' {
                    idx - 1
                } else {
                    idx
                };
                line_spans.push((start, end));
                start = idx + 1;
            }
        }
        if start < text.len() {
            line_spans.push((start, text.len()));
        }
        Self { text, line_spans }
    }

    /// The full raw text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines, matching `str::lines` semantics
    pub fn line_count(&self) -> usize {
        self.line_spans.len()
    }

    /// A single line by 1-based number, without its terminator
    pub fn line(&self, number: usize) -> Option<&str> {
        let index = number.checked_sub(1)?;
        let (start, end) = *self.line_spans.get(index)?;
        Some(&self.text[start..end])
    }

    /// Iterate the lines in document order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.line_spans
            .iter()
            .map(move |&(start, end)| &self.text[start..end])
    }
}

impl From<&str> for SourceDocument {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_no_lines() {
        let doc = SourceDocument::new("");
        assert_eq!(doc.line_count(), 0);
        assert_eq!(doc.line(1), None);
    }

    #[test]
    fn test_lines_match_str_lines() {
        let text = "first\nsecond\n\nfourth";
        let doc = SourceDocument::new(text);
        let indexed: Vec<&str> = doc.lines().collect();
        let direct: Vec<&str> = text.lines().collect();
        assert_eq!(indexed, direct);
        assert_eq!(doc.line_count(), 4);
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        let doc = SourceDocument::new("only line\n");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line(1), Some("only line"));
        assert_eq!(doc.line(2), None);
    }

    #[test]
    fn test_crlf_terminators_stripped() {
        let doc = SourceDocument::new("a\r\nb\r\n");
        assert_eq!(doc.line(1), Some("a"));
        assert_eq!(doc.line(2), Some("b"));
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let doc = SourceDocument::new("x\ny");
        assert_eq!(doc.line(0), None);
        assert_eq!(doc.line(1), Some("x"));
    }
}
