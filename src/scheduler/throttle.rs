//! Proactive request throttle
//!
//! Token bucket built on the governor crate. Opt-in: the scheduler's
//! reactive deadline handling is exact on its own, but a throttle keeps a
//! busy caller from burning the whole quota before the first 403 arrives.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for the proactive throttle
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl ThrottleConfig {
    /// Create a new throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket pacing outgoing requests
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Create a new throttle with the given config
    pub fn new(config: &ThrottleConfig) -> Self {
        let one = NonZeroU32::MIN;
        let quota = Quota::per_second(NonZeroU32::new(config.requests_per_second).unwrap_or(one))
            .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(one));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be sent
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Check if a request could be sent immediately
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish()
    }
}

#[cfg(test)]
mod throttle_tests {
    use super::*;

    #[test]
    fn test_throttle_config_default() {
        let config = ThrottleConfig::default();
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.burst_size, 10);
    }

    #[test]
    fn test_throttle_allows_burst() {
        let throttle = Throttle::new(&ThrottleConfig::new(10, 5));

        for _ in 0..5 {
            assert!(throttle.check());
        }
    }

    #[tokio::test]
    async fn test_throttle_acquire_within_burst() {
        let throttle = Throttle::new(&ThrottleConfig::new(100, 10));

        // Should complete without blocking
        throttle.acquire().await;
    }
}
