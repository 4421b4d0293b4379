//! Retrying transport decorator with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use currency_types::ProviderError;
use tokio::time::sleep;
use tracing::warn;

use crate::transport::{Transport, UpstreamResponse};

/// How often and how patiently to retry transient upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before retry `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Two retries, waiting 2s then 4s.
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
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

    /// Never retry.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before the `retry`-th retry (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Server errors and request timeouts are worth another attempt.
    pub fn is_retryable_status(status: u16) -> bool {
        status >= 500 || status == 408
    }

    fn should_retry(outcome: &Result<UpstreamResponse, ProviderError>) -> bool {
        match outcome {
            Ok(resp) => Self::is_retryable_status(resp.status),
            Err(ProviderError::Transport(_)) => true,
            Err(_) => false,
        }
    }
}

/// Wraps a transport and retries transient failures.
///
/// When retries run out the last outcome is returned as-is: a retryable
/// status comes back as a normal response, a transport failure as the error.
pub struct Retry<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> Retry<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for Retry<T> {
    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<UpstreamResponse, ProviderError> {
        let mut retry = 0;
        loop {
            let outcome = self.inner.get(path, query).await;
            if retry >= self.policy.max_retries || !RetryPolicy::should_retry(&outcome) {
                return outcome;
            }

            retry += 1;
            let delay = self.policy.delay_for(retry);
            match &outcome {
                Ok(resp) => warn!(
                    path,
                    status = resp.status,
                    "Retrying upstream request (attempt {}/{}) in {:?}",
                    retry,
                    self.policy.max_retries,
                    delay
                ),
                Err(e) => warn!(
                    path,
                    error = %e,
                    "Retrying upstream request (attempt {}/{}) in {:?}",
                    retry,
                    self.policy.max_retries,
                    delay
                ),
            }
            sleep(delay).await;
        }
    }
}
