//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the configuration store and the management API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required configuration (API URL or bearer token) is missing
    #[error("{0}")]
    Configuration(String),

    /// User input failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration document could not be read or written
    #[error("failed to access configuration at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport-level failure reaching the server
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Server answered with a status the operation does not accept
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A page request failed while walking a paginated collection
    #[error("failed to fetch page ({status}): {body}")]
    Fetch { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status carried by `Api` and `Fetch` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

/// Result alias used throughout the client core.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
