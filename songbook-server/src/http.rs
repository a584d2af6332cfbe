//! Outgoing HTTP capability
//!
//! Every network call (tab sites, spreadsheet feed, generative API) goes
//! through an injected [`HttpTransport`]. Production uses
//! [`ReqwestTransport`]; tests script responses with `mock::MockTransport`
//! (unit tests, or the `test-util` feature).

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outgoing request
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.to_string()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Headers a desktop browser sends when navigating to a page
    pub fn browser_navigation(self) -> Self {
        self.header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.5")
        .header("Upgrade-Insecure-Requests", "1")
        .header("Sec-Fetch-Dest", "document")
        .header("Sec-Fetch-Mode", "navigate")
        .header("Sec-Fetch-Site", "none")
        .header("Cache-Control", "max-age=0")
    }
}

/// Response with the body already read as text
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Transport failures (no response received)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

/// Injected HTTP capability
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one request; non-2xx statuses are returned, not raised
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent)
                .map_err(|e| TransportError::Setup(format!("Invalid User-Agent: {}", e)))?,
        );

        let http_client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        debug!(url = %request.url, method = ?request.method, "HTTP request");

        let mut builder = match request.method {
            Method::Get => self.http_client.get(&request.url),
            Method::Post => self.http_client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("Reading body failed: {}", e)))?;

        debug!(url = %request.url, status, bytes = body.len(), "HTTP response");
        Ok(FetchResponse { status, body })
    }
}

// ============================================================================
// Scripted transport
// ============================================================================

#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    //! Scripted transport for tests

    use super::*;
    use std::sync::Mutex;

    enum Reply {
        Response(FetchResponse),
        Fail(String),
        Slow(Duration, FetchResponse),
    }

    /// Answers requests by URL prefix and records every request it sees
    ///
    /// Routes are matched in registration order; unmatched URLs get a 404.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<Vec<(String, Reply)>>,
        requests: Mutex<Vec<FetchRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer URLs starting with `prefix`
        pub fn respond(self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
            self.push(prefix, Reply::Response(FetchResponse::new(status, body)))
        }

        /// Fail URLs starting with `prefix` without a response
        pub fn fail(self, prefix: &str, message: &str) -> Self {
            self.push(prefix, Reply::Fail(message.to_string()))
        }

        /// Answer after a delay
        pub fn respond_after(
            self,
            prefix: &str,
            delay: Duration,
            status: u16,
            body: impl Into<String>,
        ) -> Self {
            self.push(prefix, Reply::Slow(delay, FetchResponse::new(status, body)))
        }

        fn push(self, prefix: &str, reply: Reply) -> Self {
            self.routes
                .lock()
                .expect("mock routes poisoned")
                .push((prefix.to_string(), reply));
            self
        }

        /// Every request received so far
        pub fn requests(&self) -> Vec<FetchRequest> {
            self.requests.lock().expect("mock requests poisoned").clone()
        }

        /// URLs requested so far
        pub fn urls(&self) -> Vec<String> {
            self.requests().into_iter().map(|r| r.url).collect()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().expect("mock requests poisoned").len()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
            let reply = {
                let routes = self.routes.lock().expect("mock routes poisoned");
                routes
                    .iter()
                    .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
                    .map(|(_, reply)| match reply {
                        Reply::Response(r) => Ok((None, r.clone())),
                        Reply::Slow(delay, r) => Ok((Some(*delay), r.clone())),
                        Reply::Fail(msg) => Err(msg.clone()),
                    })
            };
            self.requests
                .lock()
                .expect("mock requests poisoned")
                .push(request);

            match reply {
                Some(Ok((delay, response))) => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(response)
                }
                Some(Err(msg)) => Err(TransportError::Request(msg)),
                None => Ok(FetchResponse::new(404, "")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn test_client_creation() {
        let transport = ReqwestTransport::new("songbook-test/1.0", Duration::from_secs(5));
        assert!(transport.is_ok());
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let transport = ReqwestTransport::new("bad\nagent", Duration::from_secs(5));
        assert!(matches!(transport, Err(TransportError::Setup(_))));
    }

    #[test]
    fn test_post_json_sets_content_type() {
        let request = FetchRequest::post_json("http://x", &serde_json::json!({"a": 1}));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "Content-Type" && v == "application/json"));
    }

    #[tokio::test]
    async fn test_mock_routes_by_prefix_and_records() {
        let transport = MockTransport::new()
            .respond("https://a.test/ok", 200, "hello")
            .fail("https://a.test/down", "connection refused");

        let ok = transport
            .fetch(FetchRequest::get("https://a.test/ok?x=1"))
            .await
            .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.body, "hello");

        assert!(transport
            .fetch(FetchRequest::get("https://a.test/down"))
            .await
            .is_err());

        let missing = transport
            .fetch(FetchRequest::get("https://b.test/"))
            .await
            .unwrap();
        assert_eq!(missing.status, 404);

        assert_eq!(transport.request_count(), 3);
    }
}
