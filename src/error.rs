// src/error.rs - Error kinds surfaced by the SDK
use thiserror::Error;

use crate::classifier::ServerErrorKind;

/// Top-level error delivered to every listener and returned by every operation.
#[derive(Debug, Clone, Error)]
pub enum VerdiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("SDK is not initialized")]
    NotInitialized,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service unavailable: HTTP {status} {message}")]
    ServiceUnavailable { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Malformed response payload: {0}")]
    Codec(String),
}

impl VerdiError {
    /// Server response code carried by a classified error, if any.
    pub fn response_code(&self) -> Option<i32> {
        match self {
            VerdiError::Domain(e) => e.code,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for VerdiError {
    fn from(e: serde_json::Error) -> Self {
        VerdiError::Codec(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("app id is empty")]
    AppIdEmpty,
}

/// Document input checks. `Empty` and `InvalidFormat` are reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("passport info is empty")]
    Empty,

    #[error("passport info is invalid: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// A non-zero response code classified against the server's code table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Server error {kind:?} (code {code:?}): {message}")]
pub struct DomainError {
    pub kind: ServerErrorKind,
    pub code: Option<i32>,
    pub message: String,
}
