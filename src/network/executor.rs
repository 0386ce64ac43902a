//! Request executor - turns a method/url/body into an `ExecutionResult`
//!
//! Never returns an error: construction and transport failures are encoded
//! in the result, and any received status (4xx/5xx included) is a success.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::constants::JSON_CONTENT_TYPE;
use crate::models::{ExecutionResult, RequestBlock};
use crate::network::transport::{
    OutgoingRequest, ReqwestTransport, Transport, TransportError, TransportResponse,
};

/// Executes requests through a shared transport
#[derive(Debug, Clone)]
pub struct Executor<T> {
    transport: T,
}

impl Executor<ReqwestTransport> {
    /// Executor backed by reqwest with the given request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Executor::new(ReqwestTransport::new(timeout)?))
    }
}

impl<T: Transport> Executor<T> {
    pub fn new(transport: T) -> Self {
        Executor { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a single request.
    ///
    /// A non-empty body is sent with `Content-Type: application/json`; an
    /// empty body sends no payload and no content type.
    pub async fn execute(&self, method: &str, url: &str, body: &str) -> ExecutionResult {
        let mut headers = Vec::new();
        if !body.is_empty() {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        self.dispatch(OutgoingRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers,
            body: non_empty(body),
        })
        .await
    }

    /// Execute a parsed block, sending its headers too.
    ///
    /// The JSON content type is still attached to non-empty bodies unless the
    /// block sets its own `Content-Type`.
    pub async fn execute_block(&self, block: &RequestBlock) -> ExecutionResult {
        let mut headers = Vec::with_capacity(block.headers.len() + 1);
        if !block.body.is_empty() && block.headers.get_ignore_case("Content-Type").is_none() {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }
        headers.extend(
            block
                .headers
                .iter()
                .map(|h| (h.name.clone(), h.value.clone())),
        );

        self.dispatch(OutgoingRequest {
            method: block.method.as_str().to_string(),
            url: block.url.clone(),
            headers,
            body: non_empty(&block.body),
        })
        .await
    }

    async fn dispatch(&self, request: OutgoingRequest) -> ExecutionResult {
        let method = request.method.clone();
        let url = request.url.clone();
        tracing::info!(method = %method, url = %url, "Executing request");

        let start = Instant::now();
        let outcome = self.transport.send(request).await;
        let elapsed = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(TransportResponse {
                status,
                headers,
                body,
            }) => {
                tracing::info!(method = %method, url = %url, status, duration_ms = elapsed, "Request completed");
                ExecutionResult {
                    status,
                    headers,
                    body,
                    duration_millis: elapsed,
                    error: None,
                }
            }
            // Nothing went on the wire, so there is no timing to report
            Err(TransportError::InvalidRequest(msg)) => {
                tracing::warn!(method = %method, url = %url, error = %msg, "Could not build request");
                ExecutionResult::failure(msg, 0)
            }
            Err(TransportError::Failed(msg)) => {
                tracing::warn!(method = %method, url = %url, error = %msg, duration_ms = elapsed, "Request failed");
                ExecutionResult::failure(msg, elapsed)
            }
        }
    }
}

fn non_empty(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
