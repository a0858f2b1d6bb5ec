//! Text-to-speech proxy.

use base64::Engine;
use bytes::Bytes;
use gateway_core::chat::SpeechRequest;
use gateway_core::error::UpstreamErrorCode;
use gateway_core::{Error, Result};
use tracing::debug;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::wav::{pcm_to_wav, PcmFormat};

fn pick<'a>(requested: Option<&'a str>, fallback: &'a str) -> &'a str {
    requested
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

/// Build the upstream speech request for `text`.
pub fn build_speech_request(text: &str, model: &str, voice: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        model: Some(model.to_string()),
        contents: vec![Content {
            role: None,
            parts: vec![Part::text(text)],
        }],
        generation_config: Some(GenerationConfig::audio(voice)),
    }
}

/// Decode the base64 PCM payload and wrap it in a WAVE container.
pub fn decode_audio(b64: &str) -> Result<Bytes> {
    let pcm = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| Error::internal(format!("Invalid audio payload: {}", e)))?;
    Ok(pcm_to_wav(&pcm, PcmFormat::SPEECH))
}

impl GeminiClient {
    /// Synthesize `request.text` and return a complete WAV file.
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes> {
        self.require_api_key()?;
        request.check()?;

        let model = pick(request.model.as_deref(), &self.config().tts_model);
        let voice = pick(request.voice.as_deref(), &self.config().tts_voice);
        let body = build_speech_request(&request.text, model, voice);

        let response = self
            .generate_content(model, &body, UpstreamErrorCode::Tts, "TTS")
            .await?;

        let b64 = response.first_inline_data().ok_or_else(|| {
            Error::upstream(UpstreamErrorCode::MissingAudio, "No audio in response", None)
        })?;

        let wav = decode_audio(b64)?;
        debug!(model = %model, voice = %voice, bytes = wav.len(), "Synthesized speech");
        Ok(wav)
    }
}
