//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a backend failure is worth a reconnect
//! - Hold the retry budget (attempt count) and the fixed inter-attempt delay
//!
//! # Design Decisions
//! - Only network failures are retried; anything else fails at once
//! - Delay is fixed, not exponential: the store contract promises a fixed
//!   wait between attempts

use std::time::Duration;

use crate::config::StoreConfig;
use crate::store::BackendError;

/// Budget for reconnecting to the store after a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Reconnect attempts per operation.
    pub attempts: u32,
    /// Wait before every attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// True while `attempt` (1-based) is still within budget.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.attempts
    }
}

impl From<&StoreConfig> for RetryPolicy {
    fn from(config: &StoreConfig) -> Self {
        Self::new(
            config.reconnect_attempts,
            Duration::from_millis(config.reconnect_delay_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

/// Network failures are transient; everything else is not.
pub fn is_retryable(err: &BackendError) -> bool {
    matches!(err, BackendError::Network(_))
}
