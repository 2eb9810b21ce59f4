//! Retry wrapper for operations against the remote API
//!
//! The scheduler deliberately does not retry transport failures; that is the
//! job of this wrapper, placed around each submission. The default policy
//! retries forever with a short delay and a status update per failed attempt.

use crate::types::StatusSink;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::warn;

/// Retry policy for a fallible async operation
#[derive(Debug, Clone)]
pub struct Retry {
    /// Delay between attempts
    pub delay: Duration,
    /// Maximum number of attempts; `None` retries forever
    pub attempts: Option<NonZeroU32>,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            attempts: None,
        }
    }
}

impl Retry {
    /// Create a policy with the given delay between attempts
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            attempts: None,
        }
    }

    /// Bound the number of attempts. Zero means unbounded.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = NonZeroU32::new(attempts);
        self
    }

    /// Run `op` until it succeeds, notifying `status` on every failed attempt.
    ///
    /// With a bounded policy the last error is returned once the attempts are
    /// spent; the unbounded default never returns an error.
    pub async fn run<T, E, F, Fut>(&self, status: &StatusSink, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if let Some(max) = self.attempts {
                        if attempt >= max.get() {
                            return Err(error);
                        }
                    }

                    warn!("{what} failed on attempt {attempt}: {error}");
                    status.emit(&format!("{what} failed. Retrying shortly"));
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
