//! Error types for Melon core operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the catalog backend or the
/// shared-file gateway.
#[derive(Debug, Error)]
pub enum MelonError {
    /// Transport-level HTTP failure (connect, DNS, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    /// A payload that had to be decoded strictly could not be.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The shared-file gateway rejected a request.
    #[error("file store error: {0}")]
    FileStore(String),

    /// A URL could not be built from the configured base.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl MelonError {
    /// Whether this error came from the network layer rather than from a
    /// well-formed but unsuccessful response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_))
    }
}

/// Result type for Melon core operations.
pub type Result<T> = std::result::Result<T, MelonError>;

/// Classifies a reqwest failure, mapping timeouts to [`MelonError::Timeout`].
pub(crate) fn classify(err: reqwest::Error, timeout: Duration) -> MelonError {
    if err.is_timeout() {
        MelonError::Timeout(timeout)
    } else {
        MelonError::Http(err.to_string())
    }
}
