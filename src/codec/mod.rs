pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::classifier;
use crate::error::VerdiError;
use crate::transport::HttpResponse;
use crate::Result;

/// Success code shared by every endpoint.
pub const CODE_SUCCESS: i32 = 0;

/// Common `{code, message}` envelope of service replies.
pub trait ServiceResponse {
    fn code(&self) -> Option<i32>;
    fn message(&self) -> Option<&str>;
}

pub fn encode<T: Serialize>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

pub fn decode<R: DeserializeOwned>(body: &str) -> Result<R> {
    Ok(serde_json::from_str(body)?)
}

/// Turn a raw HTTP reply into the typed payload or a typed error.
///
/// Non-2xx and empty bodies become `ServiceUnavailable`; a parsed body with a
/// code other than 0 is classified.
pub fn interpret<R>(response: HttpResponse) -> Result<R>
where
    R: DeserializeOwned + ServiceResponse,
{
    if !response.is_success() {
        return Err(VerdiError::ServiceUnavailable {
            status: response.status,
            message: response.reason,
        });
    }

    let body = match response.body.as_deref() {
        Some(body) if !body.trim().is_empty() => body,
        _ => {
            return Err(VerdiError::ServiceUnavailable {
                status: response.status,
                message: response.reason,
            })
        }
    };

    let parsed: R = decode(body)?;
    match parsed.code() {
        Some(CODE_SUCCESS) => Ok(parsed),
        code => {
            debug!(?code, message = ?parsed.message(), "Service returned an error code");
            Err(classifier::classify(code, parsed.message()).into())
        }
    }
}
