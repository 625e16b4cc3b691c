// src/transport/reqwest_client.rs - reqwest-backed HTTPS transport
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, warn};

use super::{HttpRequest, HttpResponse, Transport};
use crate::error::TransportError;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide cap on requests in flight.
pub const MAX_IN_FLIGHT: usize = 1;

pub struct ReqwestTransport {
    client: Client,
    permits: Arc<Semaphore>,
    generation: watch::Sender<u64>,
    log_bodies: AtomicBool,
}

impl ReqwestTransport {
    pub fn new(log_bodies: bool) -> Result<Self, TransportError> {
        // reqwest has no separate read/write timeouts, the request budget covers both
        Self::with_timeouts(log_bodies, CONNECT_TIMEOUT, READ_TIMEOUT + WRITE_TIMEOUT)
    }

    fn with_timeouts(
        log_bodies: bool,
        connect: Duration,
        request: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()?;

        let (generation, _) = watch::channel(0u64);

        Ok(Self {
            client,
            permits: Arc::new(Semaphore::new(MAX_IN_FLIGHT)),
            generation,
            log_bodies: AtomicBool::new(log_bodies),
        })
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let log_bodies = self.log_bodies.load(Ordering::Relaxed);
        if log_bodies {
            debug!(url = %request.url, body = %request.body, "--> POST");
        } else {
            debug!(url = %request.url, "--> POST");
        }

        let mut builder = self.client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if log_bodies {
            debug!(url = %request.url, status = status.as_u16(), body = %text, "<-- response");
        } else {
            debug!(url = %request.url, status = status.as_u16(), "<-- response");
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: if text.is_empty() { None } else { Some(text) },
        })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        // Subscribing marks the current generation as seen; only a later cancel_all fires.
        let mut cancelled = self.generation.subscribe();

        let exchange = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| TransportError::Cancelled)?;
            self.send(request).await
        };

        tokio::select! {
            result = exchange => result,
            _ = cancelled.changed() => {
                warn!("Request cancelled");
                Err(TransportError::Cancelled)
            }
        }
    }

    fn cancel_all(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    fn set_log_bodies(&self, enabled: bool) {
        self.log_bodies.store(enabled, Ordering::Relaxed);
    }
}
