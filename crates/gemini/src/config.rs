//! Generative-language API configuration.

use serde::{Deserialize, Serialize};

/// Gemini client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. Chat and speech refuse to run without it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API base URL, without a trailing `/models`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for chat and health pings
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Model used for text-to-speech
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Prebuilt voice used when the caller does not pick one
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_chat_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_tts_voice() -> String {
    "Kore".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeminiConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// `generateContent` endpoint for a model.
    pub fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}
