use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{BlobResult, StoreError, StoreResult};

/// Bounded retry around a single transport call.
///
/// Every failed attempt is retried until `max_attempts` have been made; the
/// error of the final attempt is then returned as
/// [`StoreError::Unavailable`]. There is no backoff: attempts are separated
/// by the fixed `delay`, which is zero by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Default bound for reads.
    pub const DEFAULT_READ_ATTEMPTS: u32 = 3;

    /// `max_attempts` tries with no delay. Values below 1 are raised to 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::ZERO,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn single() -> Self {
        Self::new(1)
    }

    /// Builder-style fixed delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds or the attempt bound is reached.
    ///
    /// `key` names the object involved and is carried into the error.
    pub async fn run<T, F, Fut>(&self, key: &str, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BlobResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    warn!(key, attempt, max = self.max_attempts, error = %err, "blob call failed; retrying");
                    attempt += 1;
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(err) => {
                    warn!(key, attempts = attempt, error = %err, "blob call failed; giving up");
                    return Err(StoreError::Unavailable {
                        key: key.to_string(),
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_READ_ATTEMPTS)
    }
}
