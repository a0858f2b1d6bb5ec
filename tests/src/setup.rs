//! Common test setup functions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use api::middleware::rate_limit::RateLimitConfig;
use api::{router, AppState, LeadPolicy};
use axum::Router;
use axum_test::TestServer;
use gateway_core::ManualClock;
use gemini::{GeminiClient, GeminiConfig};
use leads::{LeadNotifier, LeadSink, RecaptchaConfig, RecaptchaVerifier};

use crate::mocks::{MockLeadSink, MockNotifier};
use crate::upstream::FakeUpstream;

/// Epoch milliseconds the manual clock starts at.
pub const START_MS: u64 = 1_700_000_000_000;

/// Knobs a test may change before the router is built.
#[derive(Debug, Clone)]
pub struct TestOptions {
    pub api_key: Option<String>,
    pub recaptcha_secret: Option<String>,
    pub recaptcha_site_key: Option<String>,
    pub max_requests: usize,
    pub window_ms: u64,
    pub min_form_age_ms: u64,
    pub with_notifier: bool,
    pub static_dir: Option<PathBuf>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            recaptcha_secret: None,
            recaptcha_site_key: Some("site-key-123".to_string()),
            max_requests: 10,
            window_ms: 600_000,
            min_form_age_ms: 800,
            with_notifier: true,
            static_dir: None,
        }
    }
}

/// Test context with mock collaborators and a fake upstream.
///
/// The router is the production one, built from the same `AppState`
/// constructor `main` uses.
pub struct TestContext {
    pub upstream: FakeUpstream,
    pub sink: MockLeadSink,
    pub notifier: MockNotifier,
    pub clock: Arc<ManualClock>,
    pub router: Router,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let upstream = FakeUpstream::start().await;

        let gemini = GeminiClient::new(GeminiConfig {
            api_key: options.api_key.clone(),
            base_url: upstream.gemini_base_url(),
            timeout_secs: 5,
            ..Default::default()
        })
        .expect("Failed to create Gemini client");

        let recaptcha = RecaptchaVerifier::new(RecaptchaConfig {
            secret: options.recaptcha_secret.clone(),
            site_key: options.recaptcha_site_key.clone(),
            verify_url: upstream.verify_url(),
            timeout_secs: 5,
            ..Default::default()
        })
        .expect("Failed to create recaptcha verifier");

        let sink = MockLeadSink::new();
        let notifier = MockNotifier::new();
        let clock = Arc::new(ManualClock::new(START_MS));

        let policy = LeadPolicy {
            rate_limit: RateLimitConfig {
                window_ms: options.window_ms,
                max_requests: options.max_requests,
            },
            sweep_interval: Duration::from_secs(60),
            min_form_age_ms: options.min_form_age_ms,
        };

        let mut state = AppState::with_clock(
            gemini,
            recaptcha,
            Arc::new(sink.clone()) as Arc<dyn LeadSink>,
            policy,
            clock.clone(),
        );
        if options.with_notifier {
            state = state.with_notifier(Some(Arc::new(notifier.clone()) as Arc<dyn LeadNotifier>));
        }
        if let Some(dir) = options.static_dir.clone() {
            state = state.with_static_dir(dir);
        }

        Self {
            upstream,
            sink,
            notifier,
            clock,
            router: router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

/// The widget directory shipped with the binary.
pub fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public")
}
