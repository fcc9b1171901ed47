//! # Retry Policy
//!
//! Local retry loop shared by the model client and the Figma client.
//! Rate limits back off exponentially, other transient faults wait a
//! constant delay, and everything else propagates on the first failure.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// How a failed attempt should be treated by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Wait `base_delay * 2^attempt` before the next attempt.
    RateLimited,
    /// Wait `base_delay` before the next attempt.
    Transient,
    /// Give up immediately.
    Fatal,
}

/// Errors that know whether they are worth retrying.
pub trait Retryable {
    fn retry_class(&self) -> RetryClass;
}

impl Retryable for crate::llm::LlmError {
    fn retry_class(&self) -> RetryClass {
        match self {
            crate::llm::LlmError::RateLimited(_) => RetryClass::RateLimited,
            e if e.is_transient() => RetryClass::Transient,
            _ => RetryClass::Fatal,
        }
    }
}

impl Retryable for crate::figma::FigmaError {
    fn retry_class(&self) -> RetryClass {
        match self {
            crate::figma::FigmaError::RateLimited(_) => RetryClass::RateLimited,
            e if e.is_transient() => RetryClass::Transient,
            _ => RetryClass::Fatal,
        }
    }
}

/// Attempt budget and base delay for one outbound call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps, for tests and local stubs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
        }
    }

    /// Delay before the attempt following `attempt` (0-based), or `None` when
    /// the failure must not be retried.
    pub fn delay_for(&self, class: RetryClass, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        let base = Duration::from_millis(self.base_delay_ms);
        match class {
            RetryClass::RateLimited => Some(base * 2u32.saturating_pow(attempt)),
            RetryClass::Transient => Some(base),
            RetryClass::Fatal => None,
        }
    }
}

/// Run `op` until it succeeds, fails fatally, or the attempt budget is spent.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => match policy.delay_for(e.retry_class(), attempt) {
                Some(delay) => {
                    tracing::warn!(
                        call = label,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying after transient failure"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                None => return Err(e),
            },
        }
    }
}
