//! Live health check against the chat model.

use gateway_core::error::UpstreamErrorCode;
use gateway_core::Error;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest};

/// Configured model identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub chat_model: String,
    pub tts_model: String,
    pub voice: String,
}

/// Result of a health check. Built fresh on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    /// Whether an API key is configured at all
    pub gemini: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub models: ModelInfo,
}

impl GeminiClient {
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            chat_model: self.config().chat_model.clone(),
            tts_model: self.config().tts_model.clone(),
            voice: self.config().tts_voice.clone(),
        }
    }

    /// Ping the chat model. Never fails; problems are reported in the status.
    pub async fn health(&self) -> HealthStatus {
        let mut status = HealthStatus {
            ok: false,
            gemini: self.config().api_key().is_some(),
            reason: None,
            details: None,
            models: self.model_info(),
        };

        if !status.gemini {
            status.reason = Some("Missing GEMINI_API_KEY".to_string());
            return status;
        }

        let ping = GenerateContentRequest {
            contents: vec![Content::text("user", "ping")],
            ..Default::default()
        };

        match self
            .generate_content(&self.config().chat_model, &ping, UpstreamErrorCode::Chat, "health")
            .await
        {
            Ok(response) => {
                status.ok = response.first_text().is_some_and(|t| !t.is_empty());
                if !status.ok {
                    status.reason = Some("Empty reply from model".to_string());
                }
            }
            Err(Error::Upstream {
                code, details, ..
            }) if code == UpstreamErrorCode::Chat.code() => {
                warn!("Health ping rejected by Gemini");
                status.reason = Some("Gemini call failed".to_string());
                status.details = details;
            }
            Err(e) => {
                warn!(error = %e, "Health ping failed");
                status.reason = Some(e.to_string());
            }
        }

        status
    }
}
