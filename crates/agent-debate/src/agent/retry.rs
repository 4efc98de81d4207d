//! Rate-limit retry policy.
//!
//! Only [`GatewayError::RateLimited`] is retried. The delay before retry
//! `n` (attempts counted from 1) is `base_delay * 2^(n-1)`. Every other
//! error, timeouts included, is returned on the spot.

use super::GatewayError;
use std::future::Future;
use std::time::Duration;

/// Max retries plus exponential backoff, applied uniformly to every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. `0` means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts the policy allows, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or stays rate limited past `max_retries`.
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T, GatewayError>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<T, GatewayError>> + Send,
        T: Send,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation(attempts).await {
                Ok(output) => {
                    if attempts > 1 {
                        log::info!(
                            "{}: succeeded on attempt {}/{}",
                            label,
                            attempts,
                            self.max_attempts()
                        );
                    }
                    return Ok(output);
                }
                Err(GatewayError::RateLimited(message)) if attempts <= self.max_retries => {
                    let delay = self.delay_for(attempts);
                    log::warn!(
                        "{}: rate limited (attempt {}/{}): {}. Retrying in {:?}...",
                        label,
                        attempts,
                        self.max_attempts(),
                        message,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(GatewayError::RateLimited(message)) => {
                    log::error!(
                        "{}: still rate limited after {} attempts: {}",
                        label,
                        attempts,
                        message
                    );
                    return Err(GatewayError::RateLimitExhausted { attempts, message });
                }
                Err(e) => {
                    log::error!("{}: failed with non-retryable error: {}", label, e);
                    return Err(e);
                }
            }
        }
    }
}
