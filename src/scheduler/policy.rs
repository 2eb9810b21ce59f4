//! Rate limit detection and deadline computation
//!
//! The remote API signals rate limiting with a status code (403 for GitHub)
//! and describes the current window in a remaining-quota header and a
//! reset-time header carrying epoch seconds.

use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// How rate-limit responses are recognized and turned into a send deadline
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    /// Recognizes a rate-limit response by status code
    pub predicate: fn(StatusCode) -> bool,
    /// Header carrying the remaining request quota
    pub remaining_header: String,
    /// Header carrying the window reset time in epoch seconds
    pub reset_header: String,
    /// Window imposed when a rate-limit response has no usable headers
    pub fallback_window: Duration,
    /// Remaining quota at or below which the reset header is trusted
    pub low_water_mark: u64,
    /// Added on top of the advertised reset time
    pub safety_margin: Duration,
}

fn forbidden(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            predicate: forbidden,
            remaining_header: "x-ratelimit-remaining".to_string(),
            reset_header: "x-ratelimit-reset".to_string(),
            fallback_window: Duration::from_secs(30),
            low_water_mark: 2,
            safety_margin: Duration::from_secs(5),
        }
    }
}

impl RateLimitPolicy {
    /// Does this status signal rate limiting?
    pub fn is_limited(&self, status: StatusCode) -> bool {
        (self.predicate)(status)
    }

    /// Compute the deadline before which no request may be sent.
    ///
    /// The fallback window always applies; the reset header overrides it only
    /// when the remaining quota has actually run down to the low-water mark.
    /// The 403 itself is authoritative, so ample quota in the headers never
    /// cancels the window.
    pub fn deadline_after(&self, headers: &HeaderMap) -> Instant {
        let fallback = Instant::now() + self.fallback_window;

        let Some(remaining) = header_number(headers, &self.remaining_header) else {
            return fallback;
        };
        if remaining > self.low_water_mark {
            return fallback;
        }

        match header_number(headers, &self.reset_header) {
            Some(reset) => {
                let until = reset.saturating_sub(Utc::now().timestamp().max(0) as u64);
                Instant::now() + Duration::from_secs(until) + self.safety_margin
            }
            None => {
                warn!(
                    "quota exhausted but '{}' is missing or unreadable, using fallback window",
                    self.reset_header
                );
                fallback
            }
        }
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
