//! Application state shared across handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gateway_core::limits::{DEFAULT_MIN_FORM_AGE_MS, DEFAULT_RATE_LIMIT_SWEEP_SECS};
use gateway_core::{LeadValidator, SharedClock, SystemClock};
use gemini::GeminiClient;
use leads::{LeadNotifier, LeadSink, RecaptchaVerifier};
use tracing::debug;

use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, SharedRateLimiter};

/// Anti-abuse knobs for the lead route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadPolicy {
    pub rate_limit: RateLimitConfig,
    /// How often emptied rate-limit buckets are dropped
    pub sweep_interval: Duration,
    pub min_form_age_ms: u64,
}

impl Default for LeadPolicy {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            sweep_interval: Duration::from_secs(DEFAULT_RATE_LIMIT_SWEEP_SECS),
            min_form_age_ms: DEFAULT_MIN_FORM_AGE_MS,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Chat, speech, and health upstream
    pub gemini: GeminiClient,
    pub recaptcha: RecaptchaVerifier,
    /// Lead store (spreadsheet endpoint in production, mock in tests)
    pub lead_sink: Arc<dyn LeadSink>,
    /// Optional best-effort notifier
    pub notifier: Option<Arc<dyn LeadNotifier>>,
    pub validator: LeadValidator,
    pub rate_limiter: SharedRateLimiter,
    pub clock: SharedClock,
    pub policy: LeadPolicy,
    /// Directory served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        gemini: GeminiClient,
        recaptcha: RecaptchaVerifier,
        lead_sink: Arc<dyn LeadSink>,
        policy: LeadPolicy,
    ) -> Self {
        Self::with_clock(gemini, recaptcha, lead_sink, policy, Arc::new(SystemClock))
    }

    /// Create with an explicit clock, shared by the limiter and the timing gate.
    pub fn with_clock(
        gemini: GeminiClient,
        recaptcha: RecaptchaVerifier,
        lead_sink: Arc<dyn LeadSink>,
        policy: LeadPolicy,
        clock: SharedClock,
    ) -> Self {
        Self {
            gemini,
            recaptcha,
            lead_sink,
            notifier: None,
            validator: LeadValidator::new(policy.min_form_age_ms, clock.clone()),
            rate_limiter: Arc::new(RateLimiter::new(policy.rate_limit, clock.clone())),
            clock,
            policy,
            static_dir: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Option<Arc<dyn LeadNotifier>>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Start the rate limiter cleanup background task.
    /// Returns a handle that can be used to cancel the task.
    pub fn start_rate_limiter_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let rate_limiter = self.rate_limiter.clone();
        let period = self.policy.sweep_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let dropped = rate_limiter.cleanup_stale();
                if dropped > 0 {
                    debug!(dropped, remaining = rate_limiter.bucket_count(), "Swept rate limit buckets");
                }
            }
        })
    }
}
