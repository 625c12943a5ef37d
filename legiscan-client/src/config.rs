//! Configuration for the LegiScan client

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LegiscanError, Result};

/// Client configuration
///
/// Only `api_key` is required; everything else carries a sensible default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// LegiScan API key (the `key` query parameter). Never written to the
    /// cache or derived cache keys.
    pub api_key: String,

    /// Base endpoint for all requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding one file per cache key
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Time-to-live in seconds for refreshable operations. Static
    /// operations (immutable documents) ignore this and never expire.
    #[serde(default = "default_ttl")]
    pub cache_ttl_secs: u64,

    /// When false, a no-op store is used: every lookup misses and nothing
    /// is persisted.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Root directory for dataset archive expansion. Defaults to
    /// `<cache_dir>/datasets`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.legiscan.com/".to_string()
}

fn default_cache_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("legiscan")
}

fn default_ttl() -> u64 {
    14400 // 4 hours
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            cache_dir: default_cache_dir(),
            cache_ttl_secs: default_ttl(),
            cache_enabled: default_true(),
            extract_dir: None,
            timeout_secs: default_timeout(),
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Time-to-live (in seconds) for refreshable operations. Static
    /// objects are never re-fetched regardless of this value.
    pub fn with_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    pub fn with_cache_disabled(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    pub fn with_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(dir.into());
        self
    }

    /// Directory datasets expand into
    pub fn extract_root(&self) -> PathBuf {
        self.extract_dir
            .clone()
            .unwrap_or_else(|| self.cache_dir.join("datasets"))
    }

    /// Fail fast on configuration that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(LegiscanError::Config("API key is required".to_string()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| LegiscanError::Config(format!("invalid base URL {}: {e}", self.base_url)))?;
        Ok(())
    }
}
