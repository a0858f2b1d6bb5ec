//! Chat proxy endpoint.

use axum::{body::Bytes, extract::State, Json};
use gateway_core::{ChatReply, ChatRequest};
use telemetry::metrics;
use tracing::{debug, warn};

use super::parse_json;
use crate::response::ApiError;
use crate::state::AppState;

/// POST /api/chat - Forward one turn plus history to the chat model.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatReply>, ApiError> {
    metrics().chat_requests.inc();

    let request: ChatRequest = parse_json(&body)?;
    debug!(history = request.history.len(), "Chat request");

    let reply = state.gemini.chat(&request).await.map_err(|e| {
        warn!(error = %e, "Chat failed");
        ApiError::from(e)
    })?;

    Ok(Json(ChatReply { reply }))
}
