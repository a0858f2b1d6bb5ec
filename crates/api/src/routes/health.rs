//! Health and metrics endpoints.

use axum::{extract::State, Json};
use gemini::HealthStatus;
use telemetry::{metrics, MetricsSnapshot};

use crate::state::AppState;

/// GET /api/healthz - Live ping of the chat model.
///
/// Always 200; the body says whether the upstream answered.
pub async fn healthz_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    metrics().health_checks.inc();
    Json(state.gemini.health().await)
}

/// GET /api/metrics - In-process counters.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
