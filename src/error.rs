//! Error types for Musico

use std::time::Duration;

/// Result type alias for Musico operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote services, the local
/// store or the audio element
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was aborted after its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// API returned an unsuccessful payload
    #[error("API error: {0}")]
    Api(String),

    /// Key-value store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite failure on native targets
    #[cfg(not(target_arch = "wasm32"))]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Audio element failure
    #[error("Playback error: {0}")]
    Playback(String),
}

impl Error {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
