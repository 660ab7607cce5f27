//! Token counting for chunk budgeting

/// Counts tokens in a text span
///
/// The chunker only needs counts consistent with the target oracle's
/// encoding, not exact BPE parity, so the default implementation is a
/// heuristic estimator. Swap in an exact tokenizer behind this trait when
/// the oracle's encoding is known.
pub trait TokenCounter {
    /// Number of tokens in `text`
    fn count(&self, text: &str) -> usize;
}

/// Heuristic token estimator
///
/// English/ASCII text runs about 4 characters per token; CJK scripts about
/// 2 characters per token; Arabic about 5. Pure-ASCII input takes an O(1)
/// fast path.
///
/// # Examples
///
/// ```
/// use scrivener_chunker::{HeuristicCounter, TokenCounter};
///
/// let counter = HeuristicCounter;
/// assert_eq!(counter.count(""), 0);
/// assert_eq!(counter.count("abcdefgh"), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        if text.is_ascii() {
            return text.len() / 4;
        }

        let mut char_count = 0;
        let mut cjk_count = 0;
        let mut arabic_count = 0;
        for c in text.chars() {
            char_count += 1;
            if is_cjk_char(c) {
                cjk_count += 1;
            } else if is_arabic_char(c) {
                arabic_count += 1;
            }
        }

        if cjk_count > 0 {
            let non_cjk = char_count - cjk_count;
            (cjk_count / 2) + (non_cjk / 4)
        } else if arabic_count > char_count / 2 {
            char_count / 5
        } else {
            char_count / 4
        }
    }
}

#[inline]
fn is_cjk_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code) // CJK Unified Ideographs
        || (0x3040..=0x309F).contains(&code) // Hiragana
        || (0x30A0..=0x30FF).contains(&code) // Katakana
        || (0xAC00..=0xD7AF).contains(&code) // Hangul
}

#[inline]
fn is_arabic_char(c: char) -> bool {
    let code = c as u32;
    (0x0600..=0x06FF).contains(&code)
        || (0x0750..=0x077F).contains(&code)
        || (0x08A0..=0x08FF).contains(&code)
        || (0xFB50..=0xFDFF).contains(&code)
        || (0xFE70..=0xFEFF).contains(&code)
}
