pub mod endpoints;
pub mod reqwest_client;

pub use endpoints::{Endpoint, Environment};
pub use reqwest_client::ReqwestTransport;

use crate::error::TransportError;

/// A JSON POST ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    /// `None` when the server sent no body.
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTPS transport used by the verification client.
///
/// Implementations keep at most one request in flight; extra callers queue.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Cancel everything in flight or queued. Not per-request.
    fn cancel_all(&self);

    /// Toggle request/response body logging.
    fn set_log_bodies(&self, _enabled: bool) {}
}
