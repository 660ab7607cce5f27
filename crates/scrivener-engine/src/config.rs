//! Engine configuration

use crate::error::EngineError;
use scrivener_chunker::ChunkerConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the reconciliation engine
///
/// # Examples
///
/// ```
/// use scrivener_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.max_rounds, 12);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum oracle rounds per chunk; exceeding it is a soft stop
    /// Default: 12
    pub max_rounds: usize,

    /// Hard ceiling on estimated document tokens
    /// Default: 900_000
    pub document_token_limit: usize,

    /// How many already-stored records to preview in oracle requests
    /// Default: 3
    pub stored_preview_items: usize,

    /// Cap on ledger items per table signature, in storage and context
    /// Default: 20
    pub context_items_limit: usize,

    /// Chunking parameters
    pub chunker: ChunkerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            max_rounds: 12,
            document_token_limit: 900_000,
            stored_preview_items: 3,
            context_items_limit: 20,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    ///
    /// Runs before any chunk is processed; a failure here aborts the run.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.chunker.validate()?;
        if self.max_rounds == 0 {
            return Err(EngineError::InvalidConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.document_token_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "document_token_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, EngineError> {
        let config: Self =
            toml::from_str(text).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML text
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::InvalidConfig(e.to_string()))
    }
}
