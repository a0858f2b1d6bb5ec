//! HTTP client for the generative-language API.

use std::time::{Duration, Instant};

use gateway_core::error::{ConfigErrorCode, UpstreamErrorCode};
use gateway_core::{Error, Result};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Thin wrapper around `generateContent`. No retries: a failed call is
/// reported to the caller with the upstream payload attached.
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Creates a new client.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// The API key, or a configuration error callers surface as-is.
    pub(crate) fn require_api_key(&self) -> Result<&str> {
        self.config.api_key().ok_or_else(|| {
            Error::config(ConfigErrorCode::MissingApiKey, "Missing GEMINI_API_KEY")
        })
    }

    /// Call `generateContent` on `model`.
    ///
    /// A non-success status becomes `Error::Upstream` with `code` and the
    /// response body (JSON if it parses, raw text otherwise) in `details`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        code: UpstreamErrorCode,
        label: &str,
    ) -> Result<GenerateContentResponse> {
        let api_key = self.require_api_key()?;
        let url = self.config.generate_url(model);
        let start = Instant::now();

        debug!(model = %model, call = label, "Calling generateContent");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key as a query parameter.
                let e = e.without_url();
                metrics().upstream_errors.inc();
                warn!(model = %model, call = label, error = %e, "Gemini request failed");
                Error::upstream(
                    UpstreamErrorCode::Transport,
                    format!("Gemini {} request failed: {}", label, e),
                    None,
                )
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics().upstream_errors.inc();
            Error::upstream(
                UpstreamErrorCode::Transport,
                format!("Failed to read Gemini {} response: {}", label, e.without_url()),
                None,
            )
        })?;
        metrics()
            .upstream_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        let payload: serde_json::Value = serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::Value::String(body.clone()));

        if !status.is_success() {
            metrics().upstream_errors.inc();
            warn!(model = %model, call = label, status = %status, "Gemini returned error");
            return Err(Error::upstream(
                code,
                format!("Gemini {} error", label),
                Some(payload),
            ));
        }

        serde_json::from_value(payload).map_err(|e| {
            Error::upstream(
                UpstreamErrorCode::Transport,
                format!("Invalid Gemini {} response: {}", label, e),
                None,
            )
        })
    }
}
