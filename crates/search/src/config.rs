use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one typeahead surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestConfig {
    /// Shortest normalized query that triggers a lookup
    pub min_query_chars: usize,

    /// Quiet interval before a lookup is issued
    pub debounce_ms: u64,

    /// Upper bound on candidates kept per query
    pub max_results: usize,

    /// Lifetime of a cached result; 0 disables reuse
    pub cache_ttl_secs: u64,

    /// Number of normalized queries kept in the cache
    pub cache_capacity: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            debounce_ms: 300,
            max_results: 8,
            cache_ttl_secs: 300,
            cache_capacity: 256,
        }
    }
}

impl SuggestConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_query_chars == 0 {
            return Err(SearchError::invalid_config("min_query_chars must be > 0"));
        }
        if self.debounce_ms == 0 {
            return Err(SearchError::invalid_config("debounce_ms must be > 0"));
        }
        if self.max_results == 0 {
            return Err(SearchError::invalid_config("max_results must be > 0"));
        }
        if self.cache_capacity == 0 {
            return Err(SearchError::invalid_config("cache_capacity must be > 0"));
        }
        Ok(())
    }
}
