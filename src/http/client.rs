//! Resilient HTTP client
//!
//! This module handles every upstream request, including:
//! - Building the shared reqwest client with the configured user agent
//! - Classifying responses and transport failures
//! - Retrying transient failures with exponential backoff
//! - Surfacing HTTP 404 as an absent value for optional resources

use crate::config::HttpConfig;
use crate::http::stats::{HttpStats, StatsSnapshot};
use crate::{RaError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Accept header for JSON endpoints
const ACCEPT_JSON: &str = "application/json";

/// Accept header for XML endpoints (ALTO, OAI-PMH)
const ACCEPT_XML: &str = "application/xml, text/xml, */*";

/// How a single request attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx response
    Success,
    /// HTTP 404
    NotFound,
    /// 429, 5xx gateway/server errors, timeouts and connection failures
    Retryable,
    /// Anything else; returned to the caller without retrying
    Permanent,
}

/// Returns true for status codes worth retrying
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Classifies an HTTP status code
///
/// | Status | Outcome |
/// |--------|---------|
/// | 2xx | Success |
/// | 404 | NotFound |
/// | 429, 500, 502, 503, 504 | Retryable |
/// | other | Permanent |
pub fn classify_status(status: StatusCode) -> Outcome {
    if status.is_success() {
        Outcome::Success
    } else if status == StatusCode::NOT_FOUND {
        Outcome::NotFound
    } else if is_retryable_status(status.as_u16()) {
        Outcome::Retryable
    } else {
        Outcome::Permanent
    }
}

/// Classifies a transport-level failure
pub fn classify_transport_error(error: &reqwest::Error) -> Outcome {
    if error.is_timeout() || error.is_connect() || error.is_request() && error.status().is_none()
    {
        Outcome::Retryable
    } else {
        Outcome::Permanent
    }
}

/// Retry schedule: `max_retries` retries after the first attempt, waiting
/// `backoff_base * 2^attempt` before each one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Result of one attempt, before the retry decision
enum Attempt {
    Done(Option<Vec<u8>>),
    Retry(RaError),
    Fail(RaError),
}

/// Builds the underlying reqwest client
///
/// # Example
///
/// ```no_run
/// use ra_transcripts::config::HttpConfig;
/// use ra_transcripts::http::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Shared HTTP client with retry, backoff and request counters
///
/// Cloning is cheap; clones share the connection pool and the counters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    policy: RetryPolicy,
    timeout: Duration,
    stats: Arc<HttpStats>,
}

impl HttpClient {
    /// Creates a client from configuration (read once, here)
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let inner = build_http_client(config)?;
        Ok(Self {
            inner,
            policy: RetryPolicy::new(config.max_retries, config.backoff_base()),
            timeout: config.timeout(),
            stats: Arc::new(HttpStats::new()),
        })
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Current request counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// GET returning the body; 404 is an error here
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>> {
        match self.execute(url, params, headers, false).await? {
            Some(body) => Ok(body),
            // execute only yields None when 404 is accepted as absent
            None => Err(RaError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
            }),
        }
    }

    /// GET and deserialize a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get(url, params, &[("Accept", ACCEPT_JSON)]).await?;
        serde_json::from_slice(&body).map_err(|source| RaError::Json {
            url: url.to_string(),
            source,
        })
    }

    /// GET an XML document as raw bytes
    pub async fn get_xml(&self, url: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        self.get(url, params, &[("Accept", ACCEPT_XML)]).await
    }

    /// GET a resource that may legitimately not exist
    ///
    /// # Returns
    ///
    /// * `Ok(Some(bytes))` - The resource exists
    /// * `Ok(None)` - HTTP 404, returned immediately without retrying
    /// * `Err(RaError)` - Transient failure after retries, or a permanent failure
    pub async fn get_optional(&self, url: &str, headers: &[(&str, &str)]) -> Result<Option<Vec<u8>>> {
        self.execute(url, &[], headers, true).await
    }

    /// Optional GET with the XML accept header
    pub async fn get_optional_xml(&self, url: &str) -> Result<Option<Vec<u8>>> {
        self.get_optional(url, &[("Accept", ACCEPT_XML)]).await
    }

    async fn execute(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
        not_found_is_absent: bool,
    ) -> Result<Option<Vec<u8>>> {
        let mut attempt = 0u32;

        loop {
            match self.attempt_once(url, params, headers, not_found_is_absent).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::Fail(error) => {
                    self.stats.record_error();
                    tracing::error!("GET {} failed: {}", url, error);
                    return Err(error);
                }
                Attempt::Retry(error) => {
                    if attempt >= self.policy.max_retries {
                        self.stats.record_error();
                        tracing::error!(
                            "GET {} failed after {} retries: {}",
                            url,
                            attempt,
                            error
                        );
                        return Err(error);
                    }

                    let delay = self.policy.delay_for(attempt);
                    self.stats.record_retry();
                    tracing::warn!(
                        "GET {} attempt {} failed ({}), retrying in {:?}",
                        url,
                        attempt + 1,
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt_once(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, &str)],
        not_found_is_absent: bool,
    ) -> Attempt {
        let mut request = self.inner.get(url).timeout(self.timeout);
        if !params.is_empty() {
            request = request.query(params);
        }
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        self.stats.record_request();
        let started = Instant::now();
        tracing::debug!("GET {} params={:?}", url, params);

        let response = match request.send().await {
            Ok(response) => response,
            Err(error) => {
                self.stats.record_latency(started.elapsed());
                return self.transport_failure(url, error);
            }
        };

        let status = response.status();
        match classify_status(status) {
            Outcome::Success => match response.bytes().await {
                Ok(body) => {
                    let elapsed = started.elapsed();
                    self.stats.record_latency(elapsed);
                    self.stats.record_success(body.len());
                    tracing::info!(
                        "GET {} - {:.3}s - {} bytes - {}",
                        url,
                        elapsed.as_secs_f64(),
                        body.len(),
                        status
                    );
                    Attempt::Done(Some(body.to_vec()))
                }
                Err(error) => {
                    self.stats.record_latency(started.elapsed());
                    self.transport_failure(url, error)
                }
            },
            Outcome::NotFound if not_found_is_absent => {
                self.stats.record_latency(started.elapsed());
                self.stats.record_not_found();
                tracing::debug!("GET {} - 404 not found", url);
                Attempt::Done(None)
            }
            Outcome::Retryable => {
                self.stats.record_latency(started.elapsed());
                Attempt::Retry(RaError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
            Outcome::NotFound | Outcome::Permanent => {
                self.stats.record_latency(started.elapsed());
                Attempt::Fail(RaError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                })
            }
        }
    }

    fn transport_failure(&self, url: &str, error: reqwest::Error) -> Attempt {
        let outcome = classify_transport_error(&error);
        let mapped = if error.is_timeout() {
            RaError::Timeout {
                url: url.to_string(),
            }
        } else {
            RaError::Http {
                url: url.to_string(),
                source: error,
            }
        };

        match outcome {
            Outcome::Retryable => Attempt::Retry(mapped),
            _ => Attempt::Fail(mapped),
        }
    }
}
