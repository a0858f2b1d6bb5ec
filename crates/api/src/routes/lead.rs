//! Lead capture endpoint.
//!
//! Runs behind the rate limiter. Order after that: validation gate,
//! recaptcha, sink write, then a detached notification.

use axum::{body::Bytes, extract::State, Json};
use gateway_core::{LeadRecord, Result};
use leads::spawn_notification;
use telemetry::metrics;
use tracing::{info, warn};

use crate::extractors::ClientIp;
use crate::response::{ApiError, LeadAccepted};
use crate::state::AppState;

/// POST /api/lead - Validate, verify, and store a lead.
pub async fn lead_handler(
    State(state): State<AppState>,
    client_ip: ClientIp,
    body: Bytes,
) -> std::result::Result<Json<LeadAccepted>, ApiError> {
    metrics().leads_received.inc();

    let record = match submit(&state, &client_ip, &body).await {
        Ok(record) => record,
        Err(e) => {
            metrics().leads_rejected.inc();
            warn!(client = %client_ip.key(), code = e.error_code().unwrap_or("-"), error = %e, "Lead rejected");
            return Err(e.into());
        }
    };

    metrics().leads_accepted.inc();
    info!(lead_id = %record.id, client = %record.client_id, source = %record.lead.source, "Lead stored");

    if let Some(notifier) = state.notifier.clone() {
        spawn_notification(notifier, record);
    }

    Ok(Json(LeadAccepted::new()))
}

async fn submit(state: &AppState, client_ip: &ClientIp, body: &[u8]) -> Result<LeadRecord> {
    let lead = state.validator.validate(body)?;

    state
        .recaptcha
        .verify(lead.recaptcha_token.as_deref(), client_ip.0.as_deref())
        .await?;

    let record = LeadRecord::new(lead, client_ip.key(), state.clock.now_ms());
    state.lead_sink.store(&record).await?;
    Ok(record)
}
