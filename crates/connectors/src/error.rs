//! Error types for connectors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the source or the sink
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Failed to initialize connector (e.g., HTTP client creation failed)
    #[error("failed to initialize connector: {0}")]
    Init(String),

    /// HTTP request failed (transport or non-success status)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The remote API answered, but reported a failure
    #[error("{service} returned code {code}: {message}")]
    Remote {
        /// Which API reported the failure
        service: &'static str,
        /// Vendor error code
        code: i64,
        /// Vendor error message
        message: String,
    },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The cycle deadline fired while waiting for a token or a response
    #[error("operation cancelled")]
    Cancelled,

    /// Reading or writing the persisted session failed
    #[error("session file '{}': {source}", path.display())]
    Session {
        /// Session file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl ConnectorError {
    /// Create a Remote error
    pub fn remote(service: &'static str, code: i64, message: impl Into<String>) -> Self {
        Self::Remote {
            service,
            code,
            message: message.into(),
        }
    }

    /// True if this error came from cycle cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
