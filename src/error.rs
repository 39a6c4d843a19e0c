//! Eir error types

use std::time::Duration;

/// Eir error types.
///
/// `Clone` is derived so that a deduplicated batch fetch can hand the same
/// outcome to every input position that resolved to one canonical name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EirError {
    // Remote lookup errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("drug not found: {0}")]
    NotFound(String),

    #[error("remote lookup timed out after {0:?}")]
    Timeout(Duration),

    // Resolution errors
    #[error("no confident match for query: {0:?}")]
    Unresolved(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    // Cache errors
    /// Disk persistence failed. Swallowed (logged) inside the cache layer on
    /// `put`; surfaced only where a caller asks the disk tier directly.
    #[error("cache persistence failed: {0}")]
    Persistence(String),

    // Configuration errors
    #[error("no drug source configured")]
    NoSource,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EirError {
    /// Whether a later retry of the same lookup could plausibly succeed.
    ///
    /// Retries themselves are an upstream concern; this classification only
    /// tells that layer which failures are worth one.
    pub fn is_transient(&self) -> bool {
        match self {
            EirError::Http(_) | EirError::RateLimited { .. } | EirError::Timeout(_) => true,
            EirError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Suggested delay before a retry, if the remote provided one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            EirError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EirError {
    fn from(err: serde_json::Error) -> Self {
        EirError::Json(err.to_string())
    }
}

/// Result type alias for Eir operations
pub type Result<T> = std::result::Result<T, EirError>;
