//! HTTP client for published spreadsheet CSV exports.

mod origin;

use std::time::Duration;

use reqwest::Client;
use vitrina_core::AppConfig;

use crate::error::FeedError;
use crate::parse::parse_csv;
use crate::retry::RetryPolicy;
use crate::types::ParsedCsv;

// Re-export for test visibility via `use super::*`
#[cfg(test)]
use origin::extract_domain;

/// HTTP client that downloads a CSV document and hands it to the parse layer.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Throttling, 5xx and network failures are retried per
/// [`RetryPolicy`], honouring `Retry-After` when the host sends it.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CsvClient {
    client: Client,
    retry: RetryPolicy,
}

impl CsvClient {
    /// Creates a `CsvClient` with configured timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy {
                max_retries,
                backoff_base_secs,
            },
        })
    }

    /// Creates a client from the `VITRINA_*` HTTP settings.
    ///
    /// # Errors
    ///
    /// See [`CsvClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FeedError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Downloads and parses the CSV at `url`.
    ///
    /// Structural problems inside the document are not errors here; they are
    /// returned in [`ParsedCsv::errors`] for the caller to judge.
    ///
    /// # Errors
    ///
    /// Same as [`CsvClient::download`].
    pub async fn fetch_csv(&self, url: &str) -> Result<ParsedCsv, FeedError> {
        let body = self.download(url).await?;
        let parsed = parse_csv(&body);
        tracing::debug!(
            url,
            rows = parsed.rows.len(),
            errors = parsed.errors.len(),
            "parsed catalog CSV"
        );
        Ok(parsed)
    }

    /// Downloads the raw bytes at `url`, with automatic retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`FeedError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`FeedError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`FeedError::NotFound`]: HTTP 404 (not retried).
    /// - [`FeedError::UnexpectedStatus`]: any other non-2xx status; 5xx only
    ///   after all retries exhausted.
    /// - [`FeedError::Http`]: network or TLS failure after all retries exhausted.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        let parsed_url = Self::validate_url(url)?;

        self.retry.run(url, || {
            let request_url = parsed_url.clone();
            async move {
                let response = self
                    .client
                    .get(request_url)
                    .header(
                        reqwest::header::ACCEPT,
                        "text/csv,text/plain;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok());

                    return Err(FeedError::RateLimited {
                        domain: origin::extract_domain(url),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(FeedError::NotFound {
                        url: url.to_owned(),
                    });
                }

                if !status.is_success() {
                    return Err(FeedError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }

    /// Checks that `url` is an absolute `http`/`https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] for blank, relative, or non-HTTP URLs.
    fn validate_url(url: &str) -> Result<reqwest::Url, FeedError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(FeedError::InvalidUrl {
                url: url.to_owned(),
                reason: "URL is empty".to_owned(),
            });
        }

        let parsed = reqwest::Url::parse(trimmed).map_err(|e| FeedError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(FeedError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme \"{other}\""),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
