//! Retry policies with exponential backoff
//!
//! Retries transient failures of SharePoint calls: throttling (429), the
//! gateway-style 5xx statuses, and connection-level errors. Every verb is
//! retried, including POST.

use log::{debug, info, warn};
use rand::Rng;
use reqwest::Response;
use reqwest::header::RETRY_AFTER;
use std::future::Future;
use std::time::Duration;

/// Statuses that are retried; anything else is handed back to the caller
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Retries without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

/// Types of failures and their retry behavior
#[derive(Debug, Clone, PartialEq)]
pub enum RetryableError {
    /// Connection-level errors (refused, reset, DNS)
    Network,
    /// The request timed out before a response arrived
    Timeout,
    /// HTTP 429 Too Many Requests
    RateLimited,
    /// HTTP 5xx
    ServerError(u16),
    /// HTTP 4xx other than 429
    ClientError(u16),
    Unknown,
}

impl RetryableError {
    pub fn should_retry(&self) -> bool {
        match self {
            RetryableError::Network => true,
            RetryableError::Timeout => true,
            RetryableError::RateLimited => true,
            RetryableError::ServerError(status) => RETRY_STATUSES.contains(status),
            RetryableError::ClientError(_) => false,
            RetryableError::Unknown => false,
        }
    }

    pub fn from_status_code(status: u16) -> Self {
        match status {
            429 => RetryableError::RateLimited,
            400..=499 => RetryableError::ClientError(status),
            500..=599 => RetryableError::ServerError(status),
            _ => RetryableError::Unknown,
        }
    }

    pub fn from_reqwest_error(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            RetryableError::Timeout
        } else if error.is_connect() {
            RetryableError::Network
        } else if let Some(status) = error.status() {
            Self::from_status_code(status.as_u16())
        } else {
            RetryableError::Unknown
        }
    }
}

/// Retry policy that implements exponential backoff with jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it produces a non-retryable outcome or attempts run out.
    ///
    /// The closure receives the 1-based attempt number. When the final attempt still
    /// carries a retryable status, that response is returned as-is so the caller can
    /// report it.
    pub async fn execute<F, Fut>(&self, mut operation: F) -> Result<Response, reqwest::Error>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let delay = match operation(attempt).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let should_retry = RetryableError::from_status_code(status).should_retry();

                    if !should_retry || attempt >= max_attempts {
                        if attempt > 1 {
                            info!("Request finished with status {} after {} attempts", status, attempt);
                        }
                        return Ok(response);
                    }

                    let delay = retry_after(&response)
                        .map(|delay| delay.min(self.config.max_delay))
                        .unwrap_or_else(|| self.calculate_delay(attempt));
                    warn!(
                        "Request returned retryable status {} on attempt {}/{}",
                        status, attempt, max_attempts
                    );
                    delay
                }
                Err(error) => {
                    let should_retry = RetryableError::from_reqwest_error(&error).should_retry();

                    if !should_retry || attempt >= max_attempts {
                        warn!(
                            "Request failed permanently on attempt {} (should_retry: {}): {}",
                            attempt, should_retry, error
                        );
                        return Err(error);
                    }

                    warn!("Request failed on attempt {} (retryable): {}", attempt, error);
                    self.calculate_delay(attempt)
                }
            };

            debug!("Waiting {:?} before retry", delay);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    /// Calculate exponential backoff delay with optional jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = (self.config.base_delay.as_millis() as f64)
            * self.config.backoff_multiplier.powi(attempt as i32 - 1);

        let mut delay = Duration::from_millis(delay_ms as u64).min(self.config.max_delay);

        if self.config.jitter {
            let jitter_factor = rand::rng().random_range(0.5..=1.5);
            let jittered_ms = (delay.as_millis() as f64 * jitter_factor) as u64;
            delay = Duration::from_millis(jittered_ms);
        }

        // Jitter must not push the wait past the cap
        delay.min(self.config.max_delay)
    }
}

/// `Retry-After` given in whole seconds
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
