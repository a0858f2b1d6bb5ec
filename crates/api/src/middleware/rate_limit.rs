//! Fixed-window rate limiting for lead submissions.
//!
//! Each client keeps the timestamps of its recent submissions. Timestamps
//! older than the window are dropped on every access, and a background sweep
//! drops buckets that end up empty.
//!
//! State lives in this process only. Several instances behind a load
//! balancer each enforce their own limit.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use gateway_core::error::RateLimitErrorCode;
use gateway_core::limits::{DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_MS};
use gateway_core::{Error, SharedClock};
use parking_lot::Mutex;
use telemetry::metrics;
use tracing::warn;

use crate::extractors::ClientIp;
use crate::response::ApiError;
use crate::state::AppState;

/// Header carrying the submissions left in the current window.
pub const REMAINING_HEADER: &str = "X-RateLimit-Remaining";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Submissions allowed per window
    pub max_requests: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            max_requests: DEFAULT_RATE_LIMIT_MAX,
        }
    }
}

impl RateLimitConfig {
    /// Whole seconds a denied client is told to wait.
    pub fn retry_after_secs(&self) -> u64 {
        self.window_ms.div_ceil(1000)
    }
}

/// Outcome of [`RateLimiter::allow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: usize,
    pub retry_after_secs: u64,
}

/// Per-client fixed-window limiter.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, VecDeque<u64>>>,
    config: RateLimitConfig,
    clock: SharedClock,
}

fn purge(bucket: &mut VecDeque<u64>, now: u64, window_ms: u64) {
    while let Some(&oldest) = bucket.front() {
        if now.saturating_sub(oldest) >= window_ms {
            bucket.pop_front();
        } else {
            break;
        }
    }
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record a submission for `key` if the window has room.
    pub fn allow(&self, key: &str) -> RateDecision {
        let now = self.clock.now_ms();
        let mut buckets = self.buckets.lock();

        let bucket = buckets.entry(key.to_string()).or_default();
        purge(bucket, now, self.config.window_ms);

        if bucket.len() < self.config.max_requests {
            bucket.push_back(now);
            RateDecision {
                allowed: true,
                remaining: self.config.max_requests - bucket.len(),
                retry_after_secs: 0,
            }
        } else {
            RateDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: self.config.retry_after_secs(),
            }
        }
    }

    /// Purge every bucket and drop the empty ones. Returns how many were dropped.
    pub fn cleanup_stale(&self) -> usize {
        let now = self.clock.now_ms();
        let mut buckets = self.buckets.lock();
        let before = buckets.len();

        buckets.retain(|_, bucket| {
            purge(bucket, now, self.config.window_ms);
            !bucket.is_empty()
        });

        before - buckets.len()
    }

    /// Number of tracked clients.
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().len()
    }
}

/// Shared rate limiter state.
pub type SharedRateLimiter = Arc<RateLimiter>;

/// Middleware applied to the lead route.
pub async fn limit_by_client(
    State(state): State<AppState>,
    client_ip: ClientIp,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip.key();
    let decision = state.rate_limiter.allow(key);

    if !decision.allowed {
        metrics().rate_limited_requests.inc();
        warn!(client = %key, retry_after = decision.retry_after_secs, "Lead submission rate limited");
        return Err(Error::rate_limit(
            RateLimitErrorCode::Exceeded,
            "Too many submissions. Please try again later.",
            decision.retry_after_secs,
        )
        .into());
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    Ok(response)
}
