//! Block parsing: paragraphs, tables, heading breadcrumbs

use crate::source::SourceDocument;
use crate::token::TokenCounter;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)+\|?\s*$").unwrap()
});
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+|$)").unwrap());

/// Separator between breadcrumb segments
const HEADING_SEPARATOR: &str = " > ";

/// Length of the hex-truncated table signature
const SIGNATURE_LEN: usize = 12;

/// Metadata for a markdown table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Stable hash identifying the same logical table across chunks
    pub signature: String,

    /// The raw header row
    pub header: String,

    /// Breadcrumb of enclosing section headings, if any
    pub heading_path: Option<String>,

    /// 1-based first line of the table
    pub start_line: usize,

    /// 1-based last line of the table
    pub end_line: usize,
}

/// Kind of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Prose grouped between blank lines
    Paragraph,
    /// A markdown table, header through last pipe row
    Table,
}

/// A chunkable unit of text
///
/// Every character of the source document belongs to exactly one block or
/// to the blank lines between blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Paragraph or table
    pub kind: BlockKind,

    /// The block's text, trimmed
    pub text: String,

    /// 1-based first line
    pub start_line: usize,

    /// 1-based last line
    pub end_line: usize,

    /// Token count of `text`
    pub token_count: usize,

    /// Table metadata when `kind` is `Table`
    pub table: Option<TableInfo>,

    /// Heading breadcrumb in effect where the block starts
    pub heading_path: Option<String>,
}

/// Compute the stable signature for a table
///
/// The header row is lowercased with whitespace collapsed, prefixed with
/// the heading breadcrumb, hashed, and truncated to a short hex string.
/// Stable across runs for the same header text and breadcrumb.
///
/// # Examples
///
/// ```
/// use scrivener_chunker::table_signature;
///
/// let a = table_signature("| Year | Value |", Some("Emissions > By sector"));
/// let b = table_signature("|  year  |  VALUE  |", Some("Emissions > By sector"));
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 12);
/// ```
pub fn table_signature(header_line: &str, heading_path: Option<&str>) -> String {
    let normalized = collapse_whitespace(&header_line.trim().to_lowercase());
    let seed = format!("{}|{}", heading_path.unwrap_or(""), normalized);
    let digest = Sha256::digest(seed.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..SIGNATURE_LEN].to_string()
}

/// Parse a document into an ordered block sequence
///
/// Heading lines (`#`..`######`) update the current breadcrumb stack
/// (truncated to `level - 1`, then the title is appended); the line itself
/// flows into the paragraph being collected rather than forming a block of
/// its own. A table is recognized as a pipe-delimited header row followed
/// by a dash/colon separator line.
pub fn parse_blocks<C: TokenCounter>(document: &SourceDocument, counter: &C) -> Vec<Block> {
    let lines: Vec<&str> = document.lines().collect();
    let mut blocks = Vec::new();
    let mut heading_path: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if let Some(captures) = HEADING_RE.captures(line.trim()) {
            let level = captures[1].len();
            let title = captures[2].trim().to_string();
            heading_path.truncate(level.saturating_sub(1).min(heading_path.len()));
            heading_path.push(title);
        }

        if is_table_header(line) && is_table_separator(&lines, i + 1) {
            let start = i;
            let header_line = lines[i].trim().to_string();
            i += 2;
            while i < lines.len() && !lines[i].trim().is_empty() && lines[i].contains('|') {
                i += 1;
            }
            let table_text = lines[start..i].join("\n").trim().to_string();
            let heading = breadcrumb(&heading_path);
            let signature = table_signature(&header_line, heading.as_deref());
            let table = TableInfo {
                signature,
                header: header_line,
                heading_path: heading.clone(),
                start_line: start + 1,
                end_line: i,
            };
            blocks.push(Block {
                kind: BlockKind::Table,
                token_count: counter.count(&table_text),
                text: table_text,
                start_line: start + 1,
                end_line: i,
                table: Some(table),
                heading_path: heading,
            });
            continue;
        }

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        let start = i;
        let mut paragraph_lines: Vec<&str> = Vec::new();
        while i < lines.len() {
            if lines[i].trim().is_empty() {
                break;
            }
            if is_table_header(lines[i]) && is_table_separator(&lines, i + 1) {
                break;
            }
            paragraph_lines.push(lines[i]);
            i += 1;
        }
        let paragraph_text = paragraph_lines.join("\n").trim().to_string();
        if !paragraph_text.is_empty() {
            let heading = breadcrumb(&heading_path);
            blocks.push(Block {
                kind: BlockKind::Paragraph,
                token_count: counter.count(&paragraph_text),
                text: paragraph_text,
                start_line: start + 1,
                end_line: i,
                table: None,
                heading_path: heading,
            });
        }
    }

    blocks
}

/// Split a paragraph's text into sentences at end-of-sentence punctuation
///
/// Sentences keep their terminating punctuation; a trailing run with no
/// terminator becomes a final sentence of its own. Never drops text.
pub(crate) fn split_into_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END_RE.find_iter(text) {
        let end = m.end();
        sentences.push(text[start..end].to_string());
        start = end;
    }
    if start < text.len() {
        let remainder = text[start..].trim();
        if !remainder.is_empty() {
            sentences.push(remainder.to_string());
        }
    }
    sentences
}

fn breadcrumb(heading_path: &[String]) -> Option<String> {
    if heading_path.is_empty() {
        None
    } else {
        Some(heading_path.join(HEADING_SEPARATOR))
    }
}

fn is_table_header(line: &str) -> bool {
    line.contains('|') && line.chars().any(|c| c.is_alphanumeric() || c == '_')
}

fn is_table_separator(lines: &[&str], index: usize) -> bool {
    index < lines.len() && TABLE_SEPARATOR_RE.is_match(lines[index])
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
