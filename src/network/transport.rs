//! HTTP transport seam - the executor only ever talks to `Transport`
//!
//! `ReqwestTransport` is the real implementation; tests substitute a fake.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;

use crate::constants::DEFAULT_TIMEOUT_SECS;

/// A request ready to hand to a transport
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// `None` sends no payload at all
    pub body: Option<String>,
}

/// A fully buffered response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Why a transport produced no response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be built (bad method, URL, or header); nothing was sent
    InvalidRequest(String),
    /// The request was dispatched but failed (DNS, connect, TLS, timeout, body read)
    Failed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            TransportError::Failed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Performs one network call.
///
/// Implementations hold no per-call state, so one instance can be shared by
/// any number of concurrent executions.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// reqwest-backed transport with a fixed timeout
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .http1_only()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ReqwestTransport { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build(&self, request: OutgoingRequest) -> Result<reqwest::Request, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            TransportError::InvalidRequest(format!("bad method {:?}: {}", request.method, e))
        })?;
        let url = reqwest::Url::parse(&request.url).map_err(|e| {
            TransportError::InvalidRequest(format!("bad URL {:?}: {}", request.url, e))
        })?;

        let mut req_builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        req_builder
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }

    fn describe(&self, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("Request timed out ({}s)", self.timeout.as_secs())
        } else if e.is_connect() {
            format!("Connection failed: {}", error_chain(e))
        } else {
            format!("Request failed: {}", error_chain(e))
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send {
        async move {
            let request = self.build(request)?;

            let resp = self
                .client
                .execute(request)
                .await
                .map_err(|e| TransportError::Failed(self.describe(&e)))?;

            let status = resp.status().as_u16();
            let headers = flatten_headers(resp.headers());
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| TransportError::Failed(format!("Error reading body: {}", e)))?;

            Ok(TransportResponse {
                status,
                headers,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }
}

/// Create the default transport (30 s timeout)
pub fn create_transport() -> Result<ReqwestTransport> {
    ReqwestTransport::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// One string per header name; repeated headers are joined with ", "
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

// reqwest's Display stops at the outermost error; the cause is usually the useful part
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_flatten_headers_joins_repeated_values() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        let flat = flatten_headers(&headers);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat["set-cookie"], "a=1, b=2");
        assert_eq!(flat["content-type"], "text/plain");
    }

    #[tokio::test]
    async fn test_malformed_url_is_invalid_request() {
        let transport = create_transport().unwrap();
        let err = transport
            .send(OutgoingRequest {
                method: "GET".into(),
                url: "not a url".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_malformed_method_is_invalid_request() {
        let transport = create_transport().unwrap();
        let err = transport
            .send(OutgoingRequest {
                method: "GE T".into(),
                url: "http://127.0.0.1:1/".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_invalid_request() {
        let transport = create_transport().unwrap();
        let err = transport
            .send(OutgoingRequest {
                method: "GET".into(),
                url: "http://127.0.0.1:1/".into(),
                headers: vec![("Bad Header".into(), "x".into())],
                body: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)), "{err:?}");
    }
}
