//! Backend client error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the analysis backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// `detail` field of the error body, or the raw body.
        message: String,
    },

    /// The backend answered 2xx but the body was not the expected JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// A local file to upload could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The caller supplied an argument the backend cannot address.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// HTTP status for API errors, `None` for everything else.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
