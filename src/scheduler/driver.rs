//! Single-flight request scheduler
//!
//! One scheduler instance serves one remote endpoint/token. Requests are
//! queued FIFO and sent strictly one at a time so the rate-limit bookkeeping
//! stays exact; a rate-limited request is retried from the head of the queue
//! until the remote lets it through. Callers suspend in [`Scheduler::submit`]
//! until their own response arrives.

use super::policy::RateLimitPolicy;
use super::throttle::{Throttle, ThrottleConfig};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{JsonValue, StatusSink};
use parking_lot::Mutex;
use reqwest::{Client, Method, Response};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

// ============================================================================
// Requests
// ============================================================================

/// An immutable request descriptor.
///
/// The scheduler rebuilds the wire request from this on every send, so a
/// rate-limited request can be resent without consuming anything.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    url: Url,
    headers: HashMap<String, String>,
    body: Option<JsonValue>,
}

impl ApiRequest {
    /// Create a request with an explicit method
    pub fn new(method: Method, url: &str) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            headers: HashMap::new(),
            body: None,
        })
    }

    /// Create a GET request
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// The request method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// A queued request plus its single-use completion slot
struct PendingRequest {
    request: ApiRequest,
    done: oneshot::Sender<Result<Response>>,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Builder for a [`Scheduler`]
pub struct SchedulerBuilder {
    config: ClientConfig,
    policy: RateLimitPolicy,
    throttle: Option<ThrottleConfig>,
    status: StatusSink,
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self {
            config: ClientConfig::default(),
            policy: RateLimitPolicy::default(),
            throttle: None,
            status: StatusSink::silent(),
        }
    }
}

impl SchedulerBuilder {
    /// Set the client configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rate limit policy
    #[must_use]
    pub fn policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enable the proactive throttle
    #[must_use]
    pub fn throttle(mut self, config: ThrottleConfig) -> Self {
        self.throttle = Some(config);
        self
    }

    /// Set the status observer
    #[must_use]
    pub fn on_status(mut self, observer: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.status = StatusSink::new(observer);
        self
    }

    /// Build the scheduler
    pub fn build(self) -> Result<Scheduler> {
        let http = Client::builder()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .build()?;

        Ok(Scheduler {
            inner: Arc::new(Inner {
                http,
                config: self.config,
                policy: self.policy,
                throttle: self.throttle.as_ref().map(Throttle::new),
                status: self.status,
                queue: Mutex::new(VecDeque::new()),
                driving: AtomicBool::new(false),
                reset_at: Mutex::new(None),
            }),
        })
    }
}

/// Rate-governed single-flight request scheduler
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    config: ClientConfig,
    policy: RateLimitPolicy,
    throttle: Option<Throttle>,
    status: StatusSink,
    queue: Mutex<VecDeque<PendingRequest>>,
    driving: AtomicBool,
    reset_at: Mutex<Option<Instant>>,
}

impl Scheduler {
    /// Create a builder
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::default()
    }

    /// Create a scheduler with the given config and default policy
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// The client configuration this scheduler was built with
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Enqueue a request and wait for its response.
    ///
    /// Concurrent callers are served strictly in submission order, one
    /// request in flight at a time. Rate-limit responses are absorbed here
    /// and retried; a transport failure is delivered as the caller's error
    /// (wrap submissions in [`crate::retry::Retry`] to recover from those).
    pub async fn submit(&self, request: ApiRequest) -> Result<Response> {
        let (done, response) = oneshot::channel();
        self.inner
            .queue
            .lock()
            .push_back(PendingRequest { request, done });
        self.ensure_driving();

        response.await.map_err(|_| Error::RequestDropped)?
    }

    /// Start the drive loop unless one is already running
    fn ensure_driving(&self) {
        if self
            .inner
            .driving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.drive().await });
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.inner.config)
            .field("queued", &self.inner.queue.lock().len())
            .field("driving", &self.inner.driving.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// The drive loop. At most one runs per scheduler at any time.
    async fn drive(self: Arc<Self>) {
        loop {
            let Some(request) = self.peek_head() else {
                self.driving.store(false, Ordering::Release);
                // A submit may have landed between the peek and the flag clear
                if self.queue.lock().is_empty() {
                    return;
                }
                if self
                    .driving
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    return;
                }
                continue;
            };

            self.wait_for_reset().await;
            if let Some(throttle) = &self.throttle {
                throttle.acquire().await;
            }

            self.status.emit(&format!("Fetch {}", request.url()));
            let outcome = self.send(&request).await;

            if let Ok(response) = &outcome {
                if self.policy.is_limited(response.status()) {
                    let deadline = self.policy.deadline_after(response.headers());
                    *self.reset_at.lock() = Some(deadline);
                    self.status
                        .emit(&format!("Rate limited for {}", request.url()));
                    // The head stays queued and is retried next cycle
                    continue;
                }
            }

            debug!("completed {} {}", request.method(), request.url());
            self.status.emit(&format!("Completed {}", request.url()));
            if let Some(pending) = self.queue.lock().pop_front() {
                // The caller may have gone away; nothing to deliver to them
                let _ = pending.done.send(outcome);
            }
        }
    }

    fn peek_head(&self) -> Option<ApiRequest> {
        self.queue.lock().front().map(|p| p.request.clone())
    }

    /// Sleep out the current rate-limit deadline, if any.
    ///
    /// The remaining delay is recomputed on every pass so a deadline that
    /// moved while sleeping is honored in full.
    async fn wait_for_reset(&self) {
        loop {
            let deadline = *self.reset_at.lock();
            let Some(deadline) = deadline else { return };

            let now = Instant::now();
            if deadline <= now {
                return;
            }

            let wait = deadline - now;
            self.status.emit(&format!(
                "Waiting for rate limit to reset. Continuing in {}",
                humanize(wait)
            ));
            tokio::time::sleep(wait).await;
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone());

        for (key, value) in &self.config.default_headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

/// Render a wait duration the way a human reads it
fn humanize(wait: Duration) -> String {
    let secs = wait.as_secs();
    if secs < 90 {
        return format!("{secs}s");
    }

    let mins = (secs + 30) / 60;
    let plural = if mins == 1 { "" } else { "s" };
    format!("{mins}min{plural}")
}
