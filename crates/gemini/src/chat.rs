//! Chat proxy.

use gateway_core::chat::{ChatRequest, Role, EMPTY_REPLY};
use gateway_core::error::UpstreamErrorCode;
use gateway_core::Result;

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest};

/// Build the conversation sent upstream.
///
/// The model has no system role on this endpoint, so the system prompt goes
/// first as a user turn, followed by history and the new message.
pub fn build_chat_contents(request: &ChatRequest) -> Vec<Content> {
    let mut contents = Vec::with_capacity(request.history.len() + 2);
    contents.push(Content::text("user", request.system_prompt()));
    contents.extend(request.history.iter().map(|turn| {
        let role = match turn.role() {
            Role::Assistant => "model",
            Role::User => "user",
        };
        Content::text(role, turn.content.clone())
    }));
    contents.push(Content::text("user", request.message.clone()));
    contents
}

impl GeminiClient {
    /// Send a chat turn and return the trimmed reply.
    pub async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.require_api_key()?;
        request.check()?;

        let body = GenerateContentRequest {
            contents: build_chat_contents(request),
            ..Default::default()
        };

        let response = self
            .generate_content(&self.config().chat_model, &body, UpstreamErrorCode::Chat, "chat")
            .await?;

        let reply = response.first_text().map(str::trim).unwrap_or_default();
        Ok(if reply.is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            reply.to_string()
        })
    }
}
