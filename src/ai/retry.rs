//! Bounded Retry Policy
//!
//! Explicit retry policy for provider calls: exponential backoff with jitter,
//! capped per-delay and by a total-wait budget, so a rate-limited batch can
//! never block indefinitely. Only errors classified as retryable are retried;
//! rate-limit waits prefer the server's retry-after hint.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::types::{ErrorCategory, PaperLensError, Result};

/// Retry policy with bounded attempts and bounded total wait
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first
    pub max_attempts: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    /// Backoff multiplier per attempt
    pub backoff_factor: f64,
    /// Budget on the sum of all waits; exceeding it stops retrying
    pub max_total_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
            max_total_wait: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Backoff delay before retrying after the given attempt (1-based),
    /// without jitter. Pure, so the schedule is unit-testable.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(32);
        let millis = self.base_delay.as_millis() as f64 * self.backoff_factor.powi(exp as i32);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Drive `op` under this policy. Non-retryable errors and exhaustion of
    /// either bound return the last error unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut total_waited = Duration::ZERO;

        for attempt in 1..=max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retryable = match &err {
                        PaperLensError::Llm(llm) => llm.is_retryable(),
                        _ => false,
                    };

                    if !retryable || attempt == max_attempts {
                        return Err(err);
                    }

                    let wait = match &err {
                        // Rate limits prefer the server hint when present
                        PaperLensError::Llm(llm)
                            if llm.category == ErrorCategory::RateLimit =>
                        {
                            llm.retry_after.unwrap_or_else(|| self.delay_for(attempt))
                        }
                        _ => self.delay_for(attempt),
                    };
                    let wait = wait + random_jitter(wait);

                    if total_waited + wait > self.max_total_wait {
                        warn!(
                            attempt,
                            waited_ms = total_waited.as_millis() as u64,
                            "Retry wait budget exhausted, giving up"
                        );
                        return Err(err);
                    }

                    debug!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "Retrying after backoff"
                    );
                    sleep(wait).await;
                    total_waited += wait;
                }
            }
        }

        unreachable!("retry loop returns on final attempt")
    }
}

/// Random jitter up to a quarter of the delay
fn random_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = (delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}
