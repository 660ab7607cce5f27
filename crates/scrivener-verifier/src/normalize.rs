//! Text normalization for robust quote matching

use regex::Regex;
use std::sync::LazyLock;

static HYPHEN_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-[\r\n]+").unwrap());

/// Normalize text for quote containment checks
///
/// Rejoins words split by a hyphen at a line break, collapses all
/// whitespace runs to a single space, trims, and lowercases. Applied
/// identically to the quote and the source before containment is tested.
///
/// # Examples
///
/// ```
/// use scrivener_verifier::normalize_for_match;
///
/// assert_eq!(
///     normalize_for_match("Emission-\nreduction"),
///     normalize_for_match("emission reduction")
/// );
/// ```
pub fn normalize_for_match(text: &str) -> String {
    let dehyphenated = HYPHEN_BREAK_RE.replace_all(text, " ");
    dehyphenated
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a quote appears in the source text
///
/// False when either side is empty after trimming; otherwise true iff the
/// normalized quote is a substring of the normalized source.
///
/// # Examples
///
/// ```
/// use scrivener_verifier::quote_is_valid;
///
/// assert!(quote_is_valid("80%", "emissions fall by 80% by 2030"));
/// assert!(!quote_is_valid("", "anything"));
/// ```
pub fn quote_is_valid(quote: &str, source: &str) -> bool {
    if quote.trim().is_empty() || source.trim().is_empty() {
        return false;
    }
    normalize_for_match(source).contains(&normalize_for_match(quote))
}
