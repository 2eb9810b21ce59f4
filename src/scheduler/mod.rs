//! Request scheduler module
//!
//! Owns the ordered queue of pending requests against one remote API and
//! guarantees only one request is in flight at a time.
//!
//! # Features
//!
//! - **Single flight**: strict submission-order sends, one at a time
//! - **Rate-limit bookkeeping**: deadline derived from response headers,
//!   with a conservative fallback window on any rate-limit status
//! - **Head-of-line retry**: a rate-limited request is retried before
//!   anything queued after it
//! - **Proactive throttle**: optional token bucket in front of every send

mod driver;
mod policy;
mod throttle;

pub use driver::{ApiRequest, Scheduler, SchedulerBuilder};
pub use policy::RateLimitPolicy;
pub use throttle::{Throttle, ThrottleConfig};
