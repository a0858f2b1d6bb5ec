//! Text-to-speech endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use gateway_core::SpeechRequest;
use telemetry::metrics;
use tracing::warn;

use super::parse_json;
use crate::response::ApiError;
use crate::state::AppState;

/// POST /api/tts - Synthesize speech and return it as a WAV file.
pub async fn tts_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    metrics().tts_requests.inc();

    let request: SpeechRequest = parse_json(&body)?;
    let wav = state.gemini.synthesize(&request).await.map_err(|e| {
        warn!(error = %e, "Speech synthesis failed");
        ApiError::from(e)
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        wav,
    )
        .into_response())
}
