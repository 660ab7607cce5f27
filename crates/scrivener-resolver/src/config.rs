//! Resolver configuration

use crate::resolver::ResolverError;
use serde::{Deserialize, Serialize};

/// Configuration for the concurrent resolver
///
/// # Examples
///
/// ```
/// use scrivener_resolver::ResolverConfig;
///
/// let config = ResolverConfig::default();
/// assert_eq!(config.workers, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Number of worker tasks draining the batch queue
    /// Default: 4
    pub workers: usize,

    /// Cap on concurrent oracle calls across all workers
    /// Default: 2
    pub max_concurrent_calls: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_concurrent_calls: 2,
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.workers == 0 {
            return Err(ResolverError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_calls == 0 {
            return Err(ResolverError::InvalidConfig(
                "max_concurrent_calls must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = ResolverConfig {
            workers: 0,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_call_cap_rejected() {
        let config = ResolverConfig {
            max_concurrent_calls: 0,
            ..ResolverConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
