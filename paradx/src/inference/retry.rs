//! Retry policies for inference attempts.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::inference::InferenceError;

/// Decides whether a failed attempt is retried and how long to wait first.
///
/// `attempt` is the 1-based number of the attempt that just failed.
pub trait RetryPolicy: Send + Sync {
    fn should_retry(&self, attempt: u32, error: &InferenceError) -> bool;
    fn delay_for(&self, attempt: u32) -> Duration;
}

/// Up to `max_retries` additional attempts with the same delay before each. No jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    max_retries: u32,
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl From<&RetryConfig> for FixedBackoff {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay)
    }
}

impl RetryPolicy for FixedBackoff {
    fn should_retry(&self, attempt: u32, _error: &InferenceError) -> bool {
        attempt <= self.max_retries
    }

    fn delay_for(&self, _attempt: u32) -> Duration {
        self.delay
    }
}
