//! API routes.

pub mod chat;
pub mod config;
pub mod health;
pub mod lead;
pub mod tts;

use axum::{
    body::Bytes,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use gateway_core::limits::MAX_BODY_BYTES;
use serde::de::DeserializeOwned;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::debug;

use crate::middleware::rate_limit;
use crate::response::ApiError;
use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Only lead capture is rate limited
    let lead_routes = Router::new()
        .route("/api/lead", post(lead::lead_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_by_client,
        ));

    let mut app = Router::new()
        .route("/api/healthz", get(health::healthz_handler))
        .route("/api/metrics", get(health::metrics_handler))
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/tts", post(tts::tts_handler))
        .route("/api/config", get(config::config_handler))
        .merge(lead_routes);

    if let Some(dir) = state.static_dir.clone() {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Parse a JSON body. An empty body is treated as `{}`.
pub(crate) fn parse_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, "Rejected malformed JSON body");
        ApiError::bad_request(format!("Invalid JSON: {}", e))
    })
}
