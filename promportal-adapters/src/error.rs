//! Error types for backend access.

use thiserror::Error;

/// Which part of a query expression an identifier was destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A metric name (`cpu_seconds_total`).
    Metric,
    /// A label name, taken from an object type id.
    Label,
    /// A label value, taken from an object id.
    LabelValue,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Metric => f.write_str("metric name"),
            IdentifierKind::Label => f.write_str("label name"),
            IdentifierKind::LabelValue => f.write_str("label value"),
        }
    }
}

/// Errors that can occur when talking to the metrics backend.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// An identifier would break the query expression.
    #[error("Invalid {kind} {value:?}")]
    InvalidIdentifier { kind: IdentifierKind, value: String },

    /// Client configuration is not usable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl AdapterError {
    pub(crate) fn invalid(kind: IdentifierKind, value: &str) -> Self {
        AdapterError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(feature = "prometheus")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else if err.is_decode() {
            AdapterError::Parse(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}
