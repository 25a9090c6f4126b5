//! When to ask a sheet host again, and how long to wait first.
//!
//! Published sheets sit behind a CDN that answers load spikes with 429 or a
//! short-lived 5xx. Both are retried; a 404 or a malformed sheet is not.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

/// Longest single wait, whether computed or asked for by `Retry-After`.
const MAX_DELAY_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Attempts allowed after the first request.
    pub max_retries: u32,
    /// Doubles per attempt: `base * 2^attempt` seconds.
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt `attempt` (0-based),
    /// or `None` when `err` is final or the retries are spent.
    ///
    /// | error | wait |
    /// |---|---|
    /// | 429 with `Retry-After` | the server's value |
    /// | 429 without it, 5xx, network failure | exponential backoff |
    /// | anything else | no retry |
    ///
    /// Every wait is capped at [`MAX_DELAY_SECS`].
    pub(crate) fn delay_after(&self, err: &FeedError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let secs = match err {
            FeedError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => *secs,
            FeedError::RateLimited { .. } | FeedError::Http(_) => self.backoff_secs(attempt),
            FeedError::UnexpectedStatus { status, .. } if *status >= 500 => {
                self.backoff_secs(attempt)
            }
            _ => return None,
        };
        Some(Duration::from_secs(secs.min(MAX_DELAY_SECS)))
    }

    fn backoff_secs(&self, attempt: u32) -> u64 {
        self.backoff_base_secs.saturating_mul(1u64 << attempt.min(16))
    }

    /// Runs `request` until it succeeds or [`RetryPolicy::delay_after`] gives up,
    /// returning the last error in that case.
    pub(crate) async fn run<T, F, Fut>(&self, url: &str, mut request: F) -> Result<T, FeedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FeedError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match request().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let Some(delay) = self.delay_after(&err, attempt) else {
                return Err(err);
            };
            tracing::warn!(
                url,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %err,
                "catalog download failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
