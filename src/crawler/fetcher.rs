//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like request headers
//! - Rotating requests across a proxy pool
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, HttpConfig};
use crate::crawler::scheduler::RequestPacer;
use crate::state::RunControl;
use crate::{ConfigError, ScoutError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, Proxy};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Redirect hops followed before a fetch fails
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

/// Network-level failure for one page
///
/// Always local to that page: logged, counted and skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    /// Timeouts, connection failures and server errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Body { .. } | Self::Request { .. } => false,
        }
    }

    fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// Obtains page bodies for the crawl controller
///
/// Implemented by [`HttpFetcher`] for real runs; tests supply in-memory
/// implementations.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `http` - Request identity headers
/// * `crawler` - Timeouts
/// * `proxy` - Route every request through this proxy when given
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScoutError)` - A header value or the proxy URL is invalid
///
/// # Example
///
/// ```no_run
/// use shoe_scout::config::{CrawlerConfig, HttpConfig};
/// use shoe_scout::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default(), &CrawlerConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    http: &HttpConfig,
    crawler: &CrawlerConfig,
    proxy: Option<&str>,
) -> Result<Client, ScoutError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &http.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &http.accept_language)?,
    );

    let mut builder = Client::builder()
        .user_agent(http.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy.trim())?);
    }

    Ok(builder.build()?)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("invalid {} header: {}", name, e)))
}

/// reqwest-backed fetcher with proxy rotation, pacing and retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 4xx | Immediate failure |
/// | HTTP 5xx | Retry up to `max-retries` times |
/// | Timeout | Retry up to `max-retries` times |
/// | Connection refused | Retry up to `max-retries` times |
/// | Redirect chain > 10 | Immediate failure |
///
/// The delay before retry `n` is `retry-delay-ms * 2^n`. Every attempt waits
/// for the shared [`RequestPacer`] and goes out through the next proxy.
/// No retry is sent once the attached [`RunControl`] has stopped.
#[derive(Debug)]
pub struct HttpFetcher {
    clients: Vec<Client>,
    next_client: AtomicUsize,
    pacer: RequestPacer,
    max_retries: u32,
    retry_delay: Duration,
    control: Option<RunControl>,
}

impl HttpFetcher {
    /// Builds one client per configured proxy, or a single direct client
    pub fn new(crawler: &CrawlerConfig, http: &HttpConfig) -> Result<Self, ScoutError> {
        let clients = if http.proxies.is_empty() {
            vec![build_http_client(http, crawler, None)?]
        } else {
            http.proxies
                .iter()
                .map(|p| build_http_client(http, crawler, Some(p)))
                .collect::<Result<Vec<_>, _>>()?
        };

        tracing::debug!(
            "HTTP fetcher ready with {} client(s), {}ms between requests",
            clients.len(),
            crawler.min_request_interval_ms
        );

        Ok(Self {
            clients,
            next_client: AtomicUsize::new(0),
            pacer: RequestPacer::new(crawler.min_request_interval()),
            max_retries: crawler.max_retries,
            retry_delay: Duration::from_millis(crawler.retry_delay_ms),
            control: None,
        })
    }

    /// Stops retrying once `control` stops
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = Some(control);
        self
    }

    /// Number of rotated clients (proxies, or 1 for a direct connection)
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    fn client(&self) -> &Client {
        let i = self.next_client.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[i]
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(1u32 << attempt.min(16))
    }

    fn is_stopped(&self) -> bool {
        self.control.as_ref().is_some_and(RunControl::is_stopped)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;
        loop {
            self.pacer.wait().await;

            match fetch_once(self.client(), url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.max_retries && !self.is_stopped() => {
                    let delay = self.backoff(attempt);
                    tracing::debug!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        url,
                        delay,
                        attempt + 1,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    if self.is_stopped() {
                        tracing::debug!("Run stopped, giving up on {}", url);
                        return Err(e);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// One GET request without retries
async fn fetch_once(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return Err(FetchError::Status {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| FetchError::Body {
        url: final_url.to_string(),
        message: e.to_string(),
    })?;

    Ok(FetchedPage {
        url: final_url,
        status: status.as_u16(),
        body,
    })
}
