//! Cache store for API responses
//!
//! Entries are opaque JSON values stamped with a write time and a TTL.
//! All failure handling is local: a cache that cannot be read behaves as a
//! miss, and a cache that cannot be written is a no-op. Neither ever fails
//! a request that could succeed by going to the network.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LegiscanError, Result};

/// A cached value with its expiry metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload
    pub value: Value,

    /// When the entry was written
    pub written_at: DateTime<Utc>,

    /// Time-to-live in seconds; zero means the entry never expires
    #[serde(default)]
    pub ttl_secs: u64,
}

impl CacheEntry {
    pub fn new(value: Value, ttl_secs: u64) -> Self {
        Self {
            value,
            written_at: Utc::now(),
            ttl_secs,
        }
    }

    /// An entry is expired iff it has a nonzero TTL that has elapsed
    pub fn is_expired(&self) -> bool {
        self.ttl_secs > 0 && Utc::now() > self.written_at + Duration::seconds(self.ttl_secs as i64)
    }
}

/// Keyed store of cache entries
///
/// Implementations must be safe for concurrent access to different keys;
/// concurrent writers to the same key race with last-writer-wins.
pub trait LegiscanCache: Send + Sync {
    /// Store name, for logging
    fn name(&self) -> &'static str;

    /// Return the raw entry, expired or not, with no side effects. Used to
    /// compare fingerprints against a possibly-stale value before deciding
    /// whether to evict.
    fn peek(&self, key: &str) -> Option<CacheEntry>;

    /// Return the value if present and unexpired; delete the entry and
    /// return `None` if it has expired.
    fn get_or_expire(&self, key: &str) -> Option<Value>;

    /// Unconditional overwrite
    fn put(&self, key: &str, value: Value, ttl_secs: u64);

    /// Unconditional delete; absent keys are not an error
    fn remove(&self, key: &str);

    /// True iff present and not expired
    fn contains_valid(&self, key: &str) -> bool {
        self.peek(key).is_some_and(|entry| !entry.is_expired())
    }

    /// Store raw bytes under `key`, base64-encoded inside the entry
    /// envelope. Used for the dataset archive, whose binary body is too
    /// expensive to re-download.
    fn put_bytes(&self, key: &str, bytes: &[u8], ttl_secs: u64) {
        self.put(key, Value::String(BASE64.encode(bytes)), ttl_secs);
    }

    /// Retrieve bytes stored with [`put_bytes`](Self::put_bytes). An entry
    /// that is not a decodable base64 string counts as a miss and is
    /// evicted.
    fn bytes_or_expire(&self, key: &str) -> Option<Vec<u8>> {
        match self.get_or_expire(key)? {
            Value::String(encoded) => match BASE64.decode(encoded.as_bytes()) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    tracing::warn!(key, %err, "cached bytes are not valid base64, evicting");
                    self.remove(key);
                    None
                }
            },
            _ => {
                tracing::warn!(key, "cached entry is not a byte payload, evicting");
                self.remove(key);
                None
            }
        }
    }
}

/// File-backed cache: one JSON file per key under a base directory
pub struct FileCache {
    base_dir: PathBuf,
}

impl FileCache {
    /// Create the store, creating `base_dir` if needed. Fails fast when the
    /// directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|err| {
            LegiscanError::Config(format!(
                "could not create cache directory {}: {err}",
                base_dir.display()
            ))
        })?;
        Ok(Self { base_dir })
    }

    /// Map a key to its backing file, replacing anything outside
    /// `[A-Za-z0-9_-]` so path-like keys stay single path segments.
    fn entry_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_dir.join(format!("{safe}.json"))
    }

    fn read_entry(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(key, %err, "failed to read cache entry, treating as miss");
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(key, %err, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    fn delete_file(&self, key: &str, path: &Path) {
        if let Err(err) = fs::remove_file(path) {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(key, %err, "failed to delete cache entry");
            }
        }
    }
}

impl LegiscanCache for FileCache {
    fn name(&self) -> &'static str {
        "file"
    }

    fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.read_entry(key)
    }

    fn get_or_expire(&self, key: &str) -> Option<Value> {
        let entry = self.read_entry(key)?;
        if entry.is_expired() {
            tracing::debug!(key, "cache entry expired");
            self.delete_file(key, &self.entry_path(key));
            return None;
        }
        Some(entry.value)
    }

    fn put(&self, key: &str, value: Value, ttl_secs: u64) {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(key, %err, "failed to create cache directory");
                return;
            }
        }
        let entry = CacheEntry::new(value, ttl_secs);
        match serde_json::to_vec_pretty(&entry) {
            Ok(data) => {
                if let Err(err) = fs::write(&path, data) {
                    tracing::warn!(key, %err, "failed to write cache entry");
                }
            }
            Err(err) => tracing::warn!(key, %err, "failed to serialize cache entry"),
        }
    }

    fn remove(&self, key: &str) {
        self.delete_file(key, &self.entry_path(key));
    }
}

/// Store used when caching is disabled: always misses, never persists
pub struct NoopCache;

impl LegiscanCache for NoopCache {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn peek(&self, _key: &str) -> Option<CacheEntry> {
        None
    }

    fn get_or_expire(&self, _key: &str) -> Option<Value> {
        None
    }

    fn put(&self, _key: &str, _value: Value, _ttl_secs: u64) {}

    fn remove(&self, _key: &str) {}
}
