//! Generic evidence wrapper for oracle-claimed values

use serde::{Deserialize, Serialize};

/// A claimed value plus proof of where it came from
///
/// Every numeric/date/status value the oracle proposes must arrive wrapped
/// in one of these: the value itself (which may be null when the source is
/// explicitly silent), a verbatim quote from the source document, and a
/// confidence score in [0.0, 1.0]. The quote and confidence are mandatory
/// even when the value is null.
///
/// # Examples
///
/// ```
/// use scrivener_domain::Evidence;
///
/// let field = Evidence {
///     value: Some("2030".to_string()),
///     quote: "by 2030".to_string(),
///     confidence: 0.95,
/// };
/// assert!(field.validate().is_ok());
///
/// let absent = Evidence::<i64> {
///     value: None,
///     quote: "no baseline specified".to_string(),
///     confidence: 0.9,
/// };
/// assert!(absent.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence<T> {
    /// The extracted value (None if not present in the source)
    pub value: Option<T>,

    /// Verbatim quote from the source document
    pub quote: String,

    /// Confidence score (0.0 to 1.0)
    pub confidence: f64,
}

impl<T> Evidence<T> {
    /// Validate the proof portion of the wrapper
    ///
    /// The value is not inspected here; coercion happens downstream in the
    /// verifier once the quote has been matched against the source.
    pub fn validate(&self) -> Result<(), String> {
        if self.quote.trim().is_empty() {
            return Err("quote must be a non-empty string".to_string());
        }
        if !self.confidence.is_finite() {
            return Err("confidence must be a number".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            ));
        }
        Ok(())
    }

    /// Map the wrapped value type, keeping quote and confidence
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Evidence<U> {
        Evidence {
            value: self.value.map(f),
            quote: self.quote,
            confidence: self.confidence,
        }
    }
}
