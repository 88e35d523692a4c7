//! Error types for the channel API client

/// Result type alias for channel API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the channel API client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API answered with a non-2xx status
    #[error("API error {status}{}", detail_suffix(.detail))]
    Api {
        /// HTTP status code
        status: u16,
        /// `detail` field of the error envelope, when the body carried one
        detail: Option<String>,
    },

    /// A channel type tag outside the closed set
    #[error("Unknown channel type: {0}")]
    UnknownChannelType(String),

    /// A string that is not a `NID<network_id>-SID<service_id>` identifier
    #[error("Invalid channel id: {0}")]
    InvalidChannelId(String),

    /// The backend returned data breaking a documented invariant
    #[error("Backend contract violation: {0}")]
    Contract(String),

    /// Configuration error (from ktvconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a contract violation error
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
