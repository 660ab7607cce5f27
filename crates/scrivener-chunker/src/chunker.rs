//! Token-bounded chunking with overlap

use crate::blocks::{parse_blocks, split_into_sentences, Block, BlockKind, TableInfo};
use crate::error::ChunkerError;
use crate::source::SourceDocument;
use crate::token::TokenCounter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The only supported boundary mode
pub const BOUNDARY_PARAGRAPH_OR_SENTENCE: &str = "paragraph_or_sentence";

/// Configuration for the chunker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Token budget per chunk
    pub chunk_size_tokens: usize,

    /// Tokens of trailing context to prepend to each chunk after the first
    pub chunk_overlap_tokens: usize,

    /// Boundary mode; only "paragraph_or_sentence" is supported
    pub boundary_mode: String,

    /// Never split a table block between chunks
    pub keep_tables_intact: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 1_000,
            chunk_overlap_tokens: 100,
            boundary_mode: BOUNDARY_PARAGRAPH_OR_SENTENCE.to_string(),
            keep_tables_intact: true,
        }
    }
}

impl ChunkerConfig {
    /// Validate the configuration
    ///
    /// Fails on a zero token budget or an unsupported boundary mode. A
    /// negative overlap is unrepresentable here.
    pub fn validate(&self) -> Result<(), ChunkerError> {
        if self.chunk_size_tokens == 0 {
            return Err(ChunkerError::ZeroChunkSize);
        }
        if self.boundary_mode != BOUNDARY_PARAGRAPH_OR_SENTENCE {
            return Err(ChunkerError::UnsupportedBoundaryMode(
                self.boundary_mode.clone(),
            ));
        }
        Ok(())
    }
}

/// A token-bounded chunk of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// 0-based position in document order
    pub index: usize,

    /// Joined text, overlap included
    pub text: String,

    /// Token count of `text`
    pub token_count: usize,

    /// 1-based first line covered (overlap included)
    pub start_line: usize,

    /// 1-based last line covered
    pub end_line: usize,

    /// Tables whose lines fall inside this chunk
    pub tables: Vec<TableInfo>,
}

impl Chunk {
    /// Signatures of the tables present in this chunk
    pub fn table_signatures(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.signature.as_str()).collect()
    }
}

/// Split a document into ordered, token-bounded chunks
///
/// A document smaller than `chunk_size_tokens` yields exactly one chunk
/// equal to the whole document. Chunks are produced in document order; with
/// `keep_tables_intact`, a table that does not fit the current chunk's
/// remaining budget closes the chunk and opens the next one, even when the
/// table alone exceeds the budget.
///
/// # Examples
///
/// ```
/// use scrivener_chunker::{chunk_document, ChunkerConfig, HeuristicCounter, SourceDocument};
///
/// let config = ChunkerConfig::default();
/// let document = SourceDocument::new("A short document.");
/// let chunks = chunk_document(&document, &config, &HeuristicCounter).unwrap();
/// assert_eq!(chunks.len(), 1);
/// ```
pub fn chunk_document<C: TokenCounter>(
    document: &SourceDocument,
    config: &ChunkerConfig,
    counter: &C,
) -> Result<Vec<Chunk>, ChunkerError> {
    config.validate()?;

    let blocks = parse_blocks(document, counter);
    let blocks = split_oversized_paragraphs(blocks, config.chunk_size_tokens, counter);

    let mut base_chunks: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut current_tokens = 0usize;

    for block in blocks {
        let block_tokens = block.token_count;
        if block.kind == BlockKind::Table && config.keep_tables_intact {
            if !current.is_empty() && current_tokens + block_tokens > config.chunk_size_tokens {
                base_chunks.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            current.push(block);
            current_tokens += block_tokens;
            continue;
        }

        if !current.is_empty() && current_tokens + block_tokens > config.chunk_size_tokens {
            base_chunks.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current.push(block);
        current_tokens += block_tokens;
    }
    if !current.is_empty() {
        base_chunks.push(current);
    }

    let mut chunks = Vec::with_capacity(base_chunks.len());
    for (idx, base) in base_chunks.iter().enumerate() {
        let mut combined: Vec<&Block> = Vec::new();
        if idx > 0 && config.chunk_overlap_tokens > 0 {
            combined.extend(take_overlap_blocks(
                &base_chunks[idx - 1],
                config.chunk_overlap_tokens,
            ));
        }
        combined.extend(base.iter());

        let text = join_blocks(&combined);
        let token_count = counter.count(&text);
        let start_line = combined.first().map(|b| b.start_line).unwrap_or(0);
        let end_line = combined.last().map(|b| b.end_line).unwrap_or(0);
        let tables: Vec<TableInfo> = combined
            .iter()
            .filter_map(|b| b.table.clone())
            .collect();
        chunks.push(Chunk {
            index: idx,
            text,
            token_count,
            start_line,
            end_line,
            tables,
        });
    }

    debug!(chunks = chunks.len(), "document chunked");
    Ok(chunks)
}

/// Replace oversized paragraphs with sentence-level sub-blocks
///
/// A sentence that is itself still oversized is left oversized; nothing is
/// truncated or dropped. Tables pass through untouched.
fn split_oversized_paragraphs<C: TokenCounter>(
    blocks: Vec<Block>,
    chunk_size_tokens: usize,
    counter: &C,
) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        if block.kind != BlockKind::Paragraph || block.token_count <= chunk_size_tokens {
            out.push(block);
            continue;
        }

        let sentences = split_into_sentences(&block.text);
        if sentences.is_empty() {
            out.push(block);
            continue;
        }

        for sentence in sentences {
            let sentence_text = sentence.trim().to_string();
            if sentence_text.is_empty() {
                continue;
            }
            out.push(Block {
                kind: BlockKind::Paragraph,
                token_count: counter.count(&sentence_text),
                text: sentence_text,
                start_line: block.start_line,
                end_line: block.end_line,
                table: None,
                heading_path: block.heading_path.clone(),
            });
        }
    }
    out
}

/// Walk backward through the previous chunk until the overlap bound is met
fn take_overlap_blocks(blocks: &[Block], overlap_tokens: usize) -> Vec<&Block> {
    let mut selected = Vec::new();
    let mut tokens = 0usize;
    for block in blocks.iter().rev() {
        selected.push(block);
        tokens += block.token_count;
        if tokens >= overlap_tokens {
            break;
        }
    }
    selected.reverse();
    selected
}

fn join_blocks(blocks: &[&Block]) -> String {
    blocks
        .iter()
        .filter(|b| !b.text.is_empty())
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::HeuristicCounter;

    fn chunk(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
        let config = ChunkerConfig {
            chunk_size_tokens: size,
            chunk_overlap_tokens: overlap,
            ..ChunkerConfig::default()
        };
        chunk_document(&SourceDocument::new(text), &config, &HeuristicCounter).unwrap()
    }

    #[test]
    fn test_small_document_single_chunk() {
        let chunks = chunk("Just a short document.", 1_000, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Just a short document.");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_respects_paragraph_boundaries() {
        let paragraphs = [
            "Alpha beta gamma delta epsilon.",
            "Zeta eta theta iota kappa lambda.",
            "Mu nu xi omicron pi rho sigma.",
        ];
        let counter = HeuristicCounter;
        let markdown = paragraphs.join("\n\n");
        let chunk_size = counter.count(paragraphs[0]) + counter.count(paragraphs[1]) - 1;

        let chunks = chunk(&markdown, chunk_size, 0);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].text.contains(paragraphs[0]));
        assert!(chunks[1].text.contains(paragraphs[1]));
        assert!(!chunks[1].text.contains(paragraphs[0]));
    }

    #[test]
    fn test_splits_long_paragraph_on_sentence_end() {
        let counter = HeuristicCounter;
        let paragraph = "First sentence here today. Second sentence here now! Third sentence here?";
        let chunk_size = counter.count("First sentence here today.") + 1;

        let chunks = chunk(paragraph, chunk_size, 0);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            let last = c.text.trim().chars().last().unwrap();
            assert!(matches!(last, '.' | '!' | '?'));
        }
    }

    #[test]
    fn test_keeps_tables_intact() {
        let table = "| A | B |\n| --- | --- |\n| 1 | 2 |\n| 3 | 4 |";
        let markdown = format!("Intro text goes here first.\n\n{}\n\nOutro text.", table);

        let chunks = chunk(&markdown, 5, 0);
        let occurrences = chunks.iter().filter(|c| c.text.contains(table)).count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn test_oversized_table_starts_fresh_chunk() {
        let table = "| Col one | Col two | Col three |\n| --- | --- | --- |\n| some data | more data | yet more |\n| row two a | row two b | row two c |";
        let markdown = format!("Short intro paragraph sits here.\n\n{}", table);

        let chunks = chunk(&markdown, 6, 0);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].text.starts_with("| Col one"));
    }

    #[test]
    fn test_coverage_ignoring_overlap() {
        // Concatenating base blocks (overlap off) reconstructs the block
        // sequence exactly once.
        let paragraphs: Vec<String> = (0..8)
            .map(|i| format!("Paragraph number {} with a bit of body text.", i))
            .collect();
        let markdown = paragraphs.join("\n\n");
        let chunks = chunk(&markdown, 15, 0);
        let rebuilt = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(rebuilt, markdown);
    }

    #[test]
    fn test_overlap_prepends_previous_tail() {
        let paragraphs: Vec<String> = (0..6)
            .map(|i| format!("Paragraph number {} with a bit of body text.", i))
            .collect();
        let markdown = paragraphs.join("\n\n");
        let counter = HeuristicCounter;
        let per_block = counter.count(&paragraphs[0]);

        let chunks = chunk(&markdown, per_block * 2, per_block);
        assert!(chunks.len() >= 2);
        for window in chunks.windows(2) {
            let prev_last = window[0].text.split("\n\n").last().unwrap();
            assert!(
                window[1].text.starts_with(prev_last),
                "chunk {} does not begin with the tail of chunk {}",
                window[1].index,
                window[0].index
            );
        }
    }

    #[test]
    fn test_overlap_meets_token_bound() {
        let paragraphs: Vec<String> = (0..6)
            .map(|i| format!("Paragraph number {} with a bit of body text.", i))
            .collect();
        let markdown = paragraphs.join("\n\n");
        let counter = HeuristicCounter;
        let per_block = counter.count(&paragraphs[0]);
        let overlap = per_block + 1; // forces two tail blocks

        let config = ChunkerConfig {
            chunk_size_tokens: per_block * 3,
            chunk_overlap_tokens: overlap,
            ..ChunkerConfig::default()
        };
        let chunks = chunk_document(&SourceDocument::new(markdown.as_str()), &config, &counter).unwrap();
        assert!(chunks.len() >= 2);
        let leading: Vec<&str> = chunks[1].text.split("\n\n").collect();
        let overlap_tokens: usize = leading
            .iter()
            .take(2)
            .map(|s| counter.count(s))
            .sum();
        assert!(overlap_tokens >= overlap);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ChunkerConfig {
            chunk_size_tokens: 0,
            ..ChunkerConfig::default()
        };
        let result = chunk_document(&SourceDocument::new("text"), &config, &HeuristicCounter);
        assert!(matches!(result, Err(ChunkerError::ZeroChunkSize)));
    }

    #[test]
    fn test_unknown_boundary_mode_rejected() {
        let config = ChunkerConfig {
            boundary_mode: "word".to_string(),
            ..ChunkerConfig::default()
        };
        let result = chunk_document(&SourceDocument::new("text"), &config, &HeuristicCounter);
        assert!(matches!(
            result,
            Err(ChunkerError::UnsupportedBoundaryMode(_))
        ));
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let chunks = chunk("", 100, 0);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_reports_table_signatures() {
        let markdown = "Intro.\n\n| Year | Value |\n| --- | --- |\n| 2019 | 10 |";
        let chunks = chunk(markdown, 1_000, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].table_signatures().len(), 1);
    }
}
