//! Chat and speech request types exchanged with the browser widget.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationErrorCode};

/// System prompt used when the caller does not provide one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Reply returned when the model produced no text.
pub const EMPTY_REPLY: &str = "(no reply)";

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of caller-held conversation history.
///
/// The role is kept as the raw string the browser sent; anything other than
/// `"assistant"` is treated as the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        if self.role == "assistant" {
            Role::Assistant
        } else {
            Role::User
        }
    }
}

/// POST /api/chat body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub system: Option<String>,
}

impl ChatRequest {
    /// Reject empty messages before any outbound call.
    pub fn check(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(Error::validation(
                ValidationErrorCode::InvalidFormat,
                "Empty message",
            ));
        }
        Ok(())
    }

    pub fn system_prompt(&self) -> &str {
        match self.system.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => DEFAULT_SYSTEM_PROMPT,
        }
    }
}

/// POST /api/chat success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// POST /api/tts body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl SpeechRequest {
    pub fn check(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::validation(
                ValidationErrorCode::InvalidFormat,
                "Empty text",
            ));
        }
        if let Some(model) = self.model.as_deref().map(str::trim) {
            if !model.is_empty() && !is_model_name(model) {
                return Err(Error::validation(
                    ValidationErrorCode::InvalidFormat,
                    "Invalid model name",
                ));
            }
        }
        Ok(())
    }
}

/// Model ids become a URL path segment, so only `[A-Za-z0-9._-]` is allowed.
fn is_model_name(model: &str) -> bool {
    model
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
