use std::collections::HashMap;
use thiserror::Error;

/// Which side of the connection an HTTP failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 4xx: bad request, authentication failure, not found
    Client,
    /// 5xx: venue outage or internal fault
    Server,
}

impl ErrorKind {
    /// Classify an HTTP status code. Anything below 400 is not an error.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            0..=399 => None,
            400..=499 => Some(Self::Client),
            _ => Some(Self::Server),
        }
    }
}

#[derive(Error, Debug)]
pub enum FtxError {
    /// Connection, timeout or body-read failure in the `reqwest` transport
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Client error: {status} - {message}")]
    ClientError {
        status: u16,
        message: String,
        headers: HashMap<String, String>,
    },

    #[error("Server error: {status} - {message}")]
    ServerError {
        status: u16,
        message: String,
        headers: HashMap<String, String>,
    },

    #[error("Could not decode response: {source}")]
    DecodeError {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Venue rejected request: {0}")]
    Rejected(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Connection-level failure reported by a custom transport
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),
}

impl FtxError {
    /// Build a classified error for a status code, or `None` below 400.
    ///
    /// Message and headers are passed through untouched so callers can make
    /// their own backoff decisions.
    pub fn from_status(
        status: u16,
        message: String,
        headers: HashMap<String, String>,
    ) -> Option<Self> {
        ErrorKind::from_status(status).map(|kind| match kind {
            ErrorKind::Client => Self::ClientError {
                status,
                message,
                headers,
            },
            ErrorKind::Server => Self::ServerError {
                status,
                message,
                headers,
            },
        })
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::ClientError { .. } => Some(ErrorKind::Client),
            Self::ServerError { .. } => Some(ErrorKind::Server),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ClientError { status, .. } | Self::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::ClientError { headers, .. } | Self::ServerError { headers, .. } => Some(headers),
            _ => None,
        }
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::DecodeError { .. })
    }
}
