//! Plenario error types

use std::time::Duration;

/// Plenario error types
#[derive(Debug, thiserror::Error)]
pub enum PlenarioError {
    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Storage errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted survey file exists but cannot be decoded.
    ///
    /// Raised only while opening a store; the previous contents cannot be
    /// reconstructed, so startup must stop.
    #[error("corrupt store file {path}: {message}")]
    CorruptStore { path: String, message: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,
}

impl PlenarioError {
    /// Whether the failure is transient and the caller may try again.
    ///
    /// Store handlers use this to answer `503 Service Unavailable` instead
    /// of a generic server error.
    pub fn is_retryable(&self) -> bool {
        match self {
            PlenarioError::Http(_)
            | PlenarioError::RateLimited { .. }
            | PlenarioError::Timeout(_)
            | PlenarioError::Io(_)
            | PlenarioError::Unavailable(_) => true,
            PlenarioError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for PlenarioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not report the configured limit
            PlenarioError::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            PlenarioError::Http(format!("decode: {err}"))
        } else {
            PlenarioError::Http(err.to_string())
        }
    }
}

/// Result type alias for Plenario operations
pub type Result<T> = std::result::Result<T, PlenarioError>;
