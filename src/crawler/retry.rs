//! Retry policy with exponential backoff for transient HTTP failures
//!
//! A request is retried when the server answers with one of the configured
//! statuses (429 and the usual 5xx gateway errors by default) or when the
//! request never got an answer (connect failure, reset, timeout). Anything
//! else is final on the first attempt.
//!
//! # Delay Calculation
//!
//! ```text
//! delay(k) = min(backoff_factor * 2^(k-1), max_backoff)      k = 1, 2, ...
//! ```
//!
//! With the defaults (factor 0.6s, 5 attempts) the pauses are 0.6s, 1.2s,
//! 2.4s and 4.8s. A numeric `Retry-After` header replaces the computed delay.

use crate::config::RetryConfig;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt)
    max_attempts: u32,

    /// Delay before the first retry, in seconds
    backoff_factor: f64,

    /// Maximum delay cap, in seconds
    max_backoff: f64,

    /// Status codes worth another attempt
    statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Builds a policy from validated configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_factor: config.backoff_factor.max(0.0),
            max_backoff: config.max_backoff_secs.max(0.0),
            statuses: config.statuses.clone(),
        }
    }

    /// Total attempts allowed per request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a response with this status should be retried
    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.statuses.contains(&status.as_u16())
    }

    /// Pause before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(32) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        seconds_to_duration(secs.min(self.max_backoff))
    }

    /// Delay requested by a numeric `Retry-After` header, capped like any backoff
    pub fn retry_after(&self, headers: &HeaderMap) -> Option<Duration> {
        let secs = headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;
        Some(Duration::from_secs(secs).min(seconds_to_duration(self.max_backoff)))
    }
}

/// Millisecond resolution keeps computed pauses free of float noise
fn seconds_to_duration(secs: f64) -> Duration {
    Duration::from_millis((secs * 1000.0).round() as u64)
}
