// src/classifier.rs - Maps server response codes to typed errors
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerErrorKind {
    /// Response carried no code at all.
    MalformedResponse,
    InternalError,
    AppIdNotFound,
    AppIdBlocked,
    InvalidSignature,
    InvalidRequest,
    DeviceNotRegistered,
    PhoneCodeInvalid,
    PhoneCodeExpired,
    InvalidDocument,
    DocumentExpired,
    PersonNotFound,
    FaceMismatch,
    /// Code missing from the table; raw code and message are kept.
    Unknown,
}

/// Documented server codes. Anything else falls back to `Unknown`.
const SERVER_CODES: &[(i32, ServerErrorKind, &str)] = &[
    (-1, ServerErrorKind::InternalError, "Internal server error"),
    (1, ServerErrorKind::AppIdNotFound, "App id not found"),
    (2, ServerErrorKind::AppIdBlocked, "App id is blocked"),
    (3, ServerErrorKind::InvalidSignature, "Invalid request signature"),
    (4, ServerErrorKind::InvalidRequest, "Invalid request"),
    (5, ServerErrorKind::DeviceNotRegistered, "Device is not registered"),
    (11, ServerErrorKind::PhoneCodeInvalid, "Invalid confirmation code"),
    (12, ServerErrorKind::PhoneCodeExpired, "Confirmation code expired"),
    (17, ServerErrorKind::InvalidDocument, "Invalid document"),
    (18, ServerErrorKind::DocumentExpired, "Document expired"),
    (19, ServerErrorKind::PersonNotFound, "Person not found"),
    (20, ServerErrorKind::FaceMismatch, "Face does not match document"),
];

fn lookup(code: i32) -> Option<(ServerErrorKind, &'static str)> {
    SERVER_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, kind, description)| (*kind, *description))
}

/// Classify a non-success response. The server message wins over the table
/// description when present.
pub fn classify(code: Option<i32>, message: Option<&str>) -> DomainError {
    let message = message.filter(|m| !m.is_empty());

    let Some(code) = code else {
        return DomainError {
            kind: ServerErrorKind::MalformedResponse,
            code: None,
            message: message.unwrap_or("response code is missing").to_string(),
        };
    };

    match lookup(code) {
        Some((kind, description)) => DomainError {
            kind,
            code: Some(code),
            message: message.unwrap_or(description).to_string(),
        },
        None => DomainError {
            kind: ServerErrorKind::Unknown,
            code: Some(code),
            message: message.unwrap_or("unknown server error").to_string(),
        },
    }
}
