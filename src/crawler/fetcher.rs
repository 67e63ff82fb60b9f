//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent string
//! - GET requests for pages and document bodies
//! - HEAD requests to check Content-Type without transferring a body
//! - Retry with exponential backoff for transient failures
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 429, 500, 502, 503, 504 | Retry with backoff, then fail with the last status |
//! | Connection error / timeout | Retry with backoff, then fail |
//! | Other HTTP 4xx/5xx | Fail immediately |
//! | HTTP 2xx | Success |

use crate::config::Config;
use crate::crawler::retry::RetryPolicy;
use crate::HarvestError;
use reqwest::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Method, Response};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// A successful response whose body has not been read yet
#[derive(Debug)]
pub struct FetchResult {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Content-Length header value, if any
    pub content_length: Option<u64>,
    response: Response,
}

impl FetchResult {
    fn from_response(response: Response) -> Self {
        let content_type = header_str(&response, CONTENT_TYPE);
        let content_length = header_str(&response, CONTENT_LENGTH).and_then(|v| v.parse().ok());

        Self {
            final_url: response.url().clone(),
            status: response.status().as_u16(),
            content_type,
            content_length,
            response,
        }
    }

    /// Gives up the parsed headers and returns the underlying response for streaming
    pub fn into_response(self) -> Response {
        self.response
    }
}

fn header_str(response: &Response, name: HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// HTTP client shared by every network operation of one crawl
///
/// Constructed once per run and passed to the components that need it.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
    timeout: Duration,
}

/// Builds an HTTP client from the crawl configuration
///
/// # Example
///
/// ```no_run
/// use doc_harvest::config::Config;
/// use doc_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<HttpClient, HarvestError> {
    let timeout = Duration::from_secs(config.crawler.timeout_secs);

    let client = Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(HttpClient::new(
        client,
        RetryPolicy::from_config(&config.retry),
        timeout,
    ))
}

impl HttpClient {
    /// Wraps an existing reqwest client
    pub fn new(client: Client, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            client,
            retry,
            timeout,
        }
    }

    /// The bounded wait applied to each request and to each body read
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a GET request and requires a success status
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - 2xx response with the body still unread
    /// * `Err(HarvestError)` - Network failure or non-success status after retries
    pub async fn get(&self, url: &Url) -> Result<FetchResult, HarvestError> {
        let response = self.send_with_retry(Method::GET, url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(FetchResult::from_response(response))
    }

    /// Fetches a page and returns its decoded text body
    pub async fn fetch_page(&self, url: &Url) -> Result<String, HarvestError> {
        let fetched = self.get(url).await?;
        tracing::trace!(
            "Fetched {} ({}, {:?})",
            fetched.final_url,
            fetched.status,
            fetched.content_type
        );

        match tokio::time::timeout(self.timeout, fetched.into_response().text()).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err(HarvestError::from_reqwest(url.as_str(), e)),
            Err(_) => Err(HarvestError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Sends a HEAD request and returns the Content-Type header
    ///
    /// Any final status is accepted; only the header matters to the caller.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` - Content-Type header value
    /// * `Ok(None)` - No Content-Type header
    /// * `Err(HarvestError)` - The request failed after retries
    pub async fn probe_content_type(&self, url: &Url) -> Result<Option<String>, HarvestError> {
        let response = self.send_with_retry(Method::HEAD, url).await?;
        Ok(FetchResult::from_response(response).content_type)
    }

    /// Sends a request, retrying transient failures per the retry policy
    async fn send_with_retry(&self, method: Method, url: &Url) -> Result<Response, HarvestError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            let request = self.client.request(method.clone(), url.clone()).send();
            let outcome = match tokio::time::timeout(self.timeout, request).await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) => Err(HarvestError::from_reqwest(url.as_str(), e)),
                Err(_) => Err(HarvestError::Timeout {
                    url: url.to_string(),
                }),
            };

            let delay = match outcome {
                Ok(response) if self.retry.is_retryable_status(response.status()) => {
                    let status = response.status().as_u16();
                    if attempt >= max_attempts {
                        return Err(HarvestError::Status {
                            url: url.to_string(),
                            status,
                        });
                    }
                    let delay = self
                        .retry
                        .retry_after(response.headers())
                        .unwrap_or_else(|| self.retry.backoff(attempt));
                    tracing::debug!(
                        "{} {} returned {} (attempt {}/{}), retrying in {:?}",
                        method,
                        url,
                        status,
                        attempt,
                        max_attempts,
                        delay
                    );
                    delay
                }
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    tracing::debug!(
                        "{} {} failed (attempt {}/{}): {}, retrying in {:?}",
                        method,
                        url,
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    delay
                }
                Err(e) => return Err(e),
            };

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
