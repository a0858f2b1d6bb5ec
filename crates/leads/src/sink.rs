//! Lead sink: the spreadsheet endpoint that stores captured leads.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gateway_core::error::{ConfigErrorCode, UpstreamErrorCode};
use gateway_core::{Error, LeadRecord, Result};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::config::LeadSinkConfig;

/// Destination for validated leads.
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn store(&self, record: &LeadRecord) -> Result<()>;
}

/// POSTs each lead as JSON to a configured endpoint.
#[derive(Clone)]
pub struct HttpLeadSink {
    url: Option<String>,
    http_client: reqwest::Client,
}

impl HttpLeadSink {
    pub fn new(config: LeadSinkConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.filter(|u| !u.trim().is_empty()),
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Script endpoints often answer 200 with `{"ok": false}` on failure.
fn reports_failure(payload: &serde_json::Value) -> bool {
    payload.get("ok").and_then(|v| v.as_bool()) == Some(false)
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn store(&self, record: &LeadRecord) -> Result<()> {
        let url = self.url.as_deref().ok_or_else(|| {
            Error::config(ConfigErrorCode::MissingLeadSink, "Lead sink not configured")
        })?;
        let start = Instant::now();

        let response = self
            .http_client
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                metrics().upstream_errors.inc();
                warn!(lead_id = %record.id, error = %e, "Lead sink request failed");
                Error::upstream(
                    UpstreamErrorCode::Transport,
                    format!("Lead sink unavailable: {}", e),
                    None,
                )
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics().upstream_errors.inc();
            warn!(lead_id = %record.id, status = %status, error = %e, "Failed to read lead sink response");
            Error::upstream(
                UpstreamErrorCode::Transport,
                format!("Failed to read lead sink response: {}", e),
                None,
            )
        })?;
        metrics()
            .upstream_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        let payload: serde_json::Value = serde_json::from_str(&body)
            .unwrap_or_else(|_| serde_json::Value::String(body.clone()));

        if !status.is_success() || reports_failure(&payload) {
            metrics().upstream_errors.inc();
            warn!(lead_id = %record.id, status = %status, "Lead sink returned error");
            return Err(Error::upstream(
                UpstreamErrorCode::LeadSink,
                "Lead sink error",
                Some(payload),
            ));
        }

        debug!(lead_id = %record.id, "Lead stored");
        Ok(())
    }
}
