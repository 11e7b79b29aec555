use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use iv_core::config::FetchConfig;
use iv_core::{FailureKind, FetchError};
use tracing::{debug, warn};

/// Errors that can tell a [`RetryPolicy`] what kind of failure they are.
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

impl Classify for FetchError {
    fn failure_kind(&self) -> FailureKind {
        self.kind
    }
}

/// Bounded retries with exponential backoff. Immutable after construction.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    backoff: f64,
    retryable: HashSet<FailureKind>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff: if backoff.is_finite() && backoff >= 1.0 { backoff } else { 1.0 },
            retryable: FailureKind::DEFAULT_RETRYABLE.into_iter().collect(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.backoff)
    }

    pub fn with_retryable<I: IntoIterator<Item = FailureKind>>(mut self, kinds: I) -> Self {
        self.retryable = kinds.into_iter().collect();
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.contains(&kind)
    }

    /// Delay slept after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        self.base_delay.mul_f64(self.backoff.powi(exponent))
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable kind,
    /// or `max_attempts` is reached. The last failure is returned unchanged.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        E: Classify + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let kind = err.failure_kind();
                    if !self.is_retryable(kind) {
                        debug!("Not retrying {} failure: {}", kind, err);
                        return Err(err);
                    }
                    if attempt >= self.max_attempts {
                        warn!("Giving up after {} attempts: {}", attempt, err);
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    warn!("Retry {}/{} after {:?}: {}", attempt, self.max_attempts, delay, err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}
