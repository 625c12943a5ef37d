//! Error types for LegiScan client operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, LegiscanError>;

/// Errors that can occur while talking to the LegiScan API
///
/// Cache I/O failures have no variant here: the cache is an optimization,
/// so read failures count as misses and write failures are logged and
/// swallowed.
#[derive(Error, Debug)]
pub enum LegiscanError {
    /// HTTP or network-level failure. `status` is absent for failures below
    /// the HTTP layer (timeout, connection refused, TLS).
    #[error("transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The API signalled an application-level failure (an `alert` in the
    /// response envelope) even though the HTTP request succeeded. Not
    /// generally retryable: invalid ids and exhausted quotas land here.
    #[error("API alert: {message}")]
    Protocol { message: String },

    /// Dataset archive expansion or per-file parse failure during bulk load
    #[error("archive error at {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },

    /// Missing credential or unusable directory; raised at construction
    #[error("configuration error: {0}")]
    Config(String),

    /// A 2xx body that does not parse as the expected envelope, or an
    /// envelope missing the payload the operation promises
    #[error("malformed API response: {0}")]
    Decode(String),

    /// I/O error outside the cache (e.g. the transient archive file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LegiscanError {
    fn from(err: serde_json::Error) -> Self {
        LegiscanError::Decode(err.to_string())
    }
}
