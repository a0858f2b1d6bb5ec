//! Horizon Gateway
//!
//! Backend for the embeddable assistant widget:
//! - Chat and text-to-speech proxying to the generative-language API
//! - Lead capture with rate limiting, spam gates, and recaptcha
//! - Static hosting of the widget itself

mod settings;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use gemini::GeminiClient;
use leads::{HttpLeadSink, LeadSink, MailApiNotifier, RecaptchaVerifier};
use telemetry::{init_tracing_from_env, Redacted};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Horizon Gateway v{}", env!("CARGO_PKG_VERSION"));

    let settings = settings::load()?;
    settings.validate().context("Invalid configuration")?;

    let gemini = GeminiClient::new(settings.gemini.clone())
        .context("Failed to create Gemini client")?;
    if gemini.config().api_key().is_none() {
        warn!("GEMINI_API_KEY not set; chat and speech will be refused");
    }

    let recaptcha = RecaptchaVerifier::new(settings.recaptcha.clone())
        .context("Failed to create recaptcha verifier")?;

    let sink = HttpLeadSink::new(settings.lead_sink.clone())
        .context("Failed to create lead sink")?;
    if !sink.is_configured() {
        warn!("LEAD_SINK_URL not set; lead submissions will fail");
    }
    let lead_sink: Arc<dyn LeadSink> = Arc::new(sink);

    let notifier = MailApiNotifier::from_config(settings.notify.clone())
        .context("Failed to create lead notifier")?;

    info!(
        chat_model = %settings.gemini.chat_model,
        tts_model = %settings.gemini.tts_model,
        gemini_key = %Redacted(settings.gemini.api_key()),
        recaptcha_secret = %Redacted(settings.recaptcha.secret()),
        notify_key = %Redacted(settings.notify.api_key.as_deref()),
        notifications = notifier.is_some(),
        window_ms = settings.rate_limit.window_ms,
        max_requests = settings.rate_limit.max_requests,
        "Loaded configuration"
    );

    let state = AppState::new(gemini, recaptcha, lead_sink, settings.lead_policy())
        .with_notifier(notifier)
        .with_static_dir(&settings.static_dir);

    // Start rate limiter cleanup background task
    let _rate_limiter_cleanup = state.start_rate_limiter_cleanup();
    info!(every_secs = settings.rate_limit.sweep_secs, "Started rate limiter cleanup task");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Peer addresses back the client key when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
