//! Shared HTTP plumbing for every adapter.
//!
//! [`PanelHttp`] is the composed helper each adapter owns: base URL, default
//! (authentication) headers, the exclusively owned transport, and the retry
//! policy. It sends, logs, checks the status code and hands back the body;
//! interpreting the vendor envelope stays with the adapter.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use serde::de::DeserializeOwned;

use crate::config::ConnectionSettings;
use crate::error::{PanelError, PayloadFormat, Result, codes};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestTransport, TransportError};
use crate::utils::log_sanitizer::{redact_query, truncate_for_log};

// ============ Retry policy ============

/// Decides whether a failed exchange is re-issued.
///
/// Panels are called exactly once per operation unless a policy other than
/// [`NoRetry`] is installed through an adapter builder's `retry_policy`.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Delay before the next attempt after `attempt` (0-based) failed with
    /// `error`, or `None` to give up and surface the error.
    fn next_delay(&self, error: &PanelError, attempt: u32) -> Option<Duration>;
}

/// Never retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn next_delay(&self, _error: &PanelError, _attempt: u32) -> Option<Duration> {
        None
    }
}

/// Retry network-kind failures with exponential backoff.
///
/// Delays: 100ms, 200ms, 400ms, 800ms, ... capped at 10 seconds. Vendor,
/// validation and parse failures are never retried.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max_retries: u32,
}

impl ExponentialBackoff {
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn next_delay(&self, error: &PanelError, attempt: u32) -> Option<Duration> {
        (attempt < self.max_retries && error.is_retryable()).then(|| backoff_delay(attempt))
    }
}

/// Calculate exponential backoff delay
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}

// ============ PanelHttp ============

/// Transport and retry overrides collected by the adapter builders.
#[derive(Default)]
pub(crate) struct HttpOptions {
    pub transport: Option<Box<dyn HttpTransport>>,
    pub retry: Option<Arc<dyn RetryPolicy>>,
}

impl HttpOptions {
    /// Validate `settings` and assemble the adapter's [`PanelHttp`], creating
    /// a [`ReqwestTransport`] unless one was injected.
    pub fn into_http(self, panel: &'static str, settings: &ConnectionSettings) -> Result<PanelHttp> {
        settings.validate(panel)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new(settings).map_err(|e| {
                PanelError::validation(panel, codes::INVALID_CONFIGURATION, e.to_string())
            })?),
        };
        let mut http = PanelHttp::new(panel, settings.endpoint(), transport);
        if let Some(retry) = self.retry {
            http.set_retry_policy(retry);
        }
        Ok(http)
    }
}

/// Per-adapter HTTP helper.
pub(crate) struct PanelHttp {
    panel: &'static str,
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: Box<dyn HttpTransport>,
    retry: Arc<dyn RetryPolicy>,
}

impl PanelHttp {
    pub fn new(
        panel: &'static str,
        base_url: impl Into<String>,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        Self {
            panel,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers: Vec::new(),
            transport,
            retry: Arc::new(NoRetry),
        }
    }

    /// Attach a header to every request (authentication, content negotiation).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.default_headers.push((name.to_string(), value.into()));
        self
    }

    pub fn set_retry_policy(&mut self, retry: Arc<dyn RetryPolicy>) {
        self.retry = retry;
    }

    /// Resolve `path` against the base URL; absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub async fn get(&self, path: &str) -> Result<String> {
        self.send(HttpRequest::new(HttpMethod::Get, self.url(path)))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<String> {
        self.send(HttpRequest::new(HttpMethod::Delete, self.url(path)))
            .await
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        self.send_json(HttpMethod::Post, path, body).await
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        self.send_json(HttpMethod::Put, path, body).await
    }

    pub async fn post_form(&self, path: &str, form: String) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Post, self.url(path))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form);
        self.send(request).await
    }

    pub async fn post_xml(&self, path: &str, packet: String) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Post, self.url(path))
            .header("Content-Type", "text/xml")
            .body(packet);
        self.send(request).await
    }

    async fn send_json(
        &self,
        method: HttpMethod,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String> {
        let request = HttpRequest::new(method, self.url(path))
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.send(request).await
    }

    /// Execute `request` under the retry policy and return the 2xx body.
    pub async fn send(&self, mut request: HttpRequest) -> Result<String> {
        let mut headers = self.default_headers.clone();
        headers.append(&mut request.headers);
        request.headers = headers;

        let mut attempt = 0;
        loop {
            match self.execute_once(request.clone()).await {
                Ok(body) => return Ok(body),
                Err(e) => match self.retry.next_delay(&e, attempt) {
                    Some(delay) => {
                        log::warn!(
                            "[{}] Request failed (attempt {}), retrying in {:.1}s: {}",
                            self.panel,
                            attempt + 1,
                            delay.as_secs_f32(),
                            e
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    async fn execute_once(&self, request: HttpRequest) -> Result<String> {
        let panel = self.panel;
        log::debug!("[{panel}] {} {}", request.method, redact_query(&request.url));

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| match e {
                TransportError::Timeout(detail) => PanelError::Timeout {
                    panel: panel.to_string(),
                    detail,
                },
                TransportError::Network(detail) => PanelError::NetworkError {
                    panel: panel.to_string(),
                    detail,
                },
            })?;

        log::debug!("[{panel}] Response Status: {}", response.status);
        log::debug!("[{panel}] Response Body: {}", truncate_for_log(&response.body));

        if !response.is_success() {
            return Err(PanelError::HttpStatus {
                panel: panel.to_string(),
                status: response.status,
                body: truncate_for_log(&response.body),
            });
        }
        Ok(response.body)
    }

    pub fn parse_json<T: DeserializeOwned>(&self, response_text: &str) -> Result<T> {
        parse_json(self.panel, response_text)
    }
}

/// Parse a JSON body, mapping failures to a JSON parse error.
pub(crate) fn parse_json<T: DeserializeOwned>(panel: &str, response_text: &str) -> Result<T> {
    serde_json::from_str(response_text).map_err(|e| {
        log::error!("[{panel}] JSON parse failed: {e}");
        log::error!("[{panel}] Raw response: {}", truncate_for_log(response_text));
        PanelError::ParseError {
            panel: panel.to_string(),
            format: PayloadFormat::Json,
            detail: e.to_string(),
        }
    })
}

/// `Authorization` value for HTTP basic auth.
pub(crate) fn basic_auth(username: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}
