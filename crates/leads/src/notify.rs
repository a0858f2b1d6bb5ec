//! Best-effort notification of new leads.
//!
//! Runs after the lead is stored. Failures are logged and counted, never
//! reported to the submitter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gateway_core::error::UpstreamErrorCode;
use gateway_core::{Error, LeadRecord, Result};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::NotifyConfig;

/// Rendered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadNotification {
    pub subject: String,
    pub text: String,
}

impl LeadNotification {
    pub fn from_record(record: &LeadRecord) -> Self {
        let lead = &record.lead;
        let mut text = format!(
            "Name: {}\nEmail: {}\nSource: {}\nSubmitted: {}\n",
            lead.name,
            lead.email,
            if lead.source.is_empty() { "-" } else { &lead.source },
            record.submitted_at.to_rfc3339(),
        );
        if !lead.message.is_empty() {
            text.push('\n');
            text.push_str(&lead.message);
            text.push('\n');
        }

        Self {
            subject: format!("New lead: {}", lead.name),
            text,
        }
    }
}

/// Receives a copy of every stored lead.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, record: &LeadRecord) -> Result<()>;
}

/// Sends mail through an HTTP mail API (`{from, to, subject, text}` + bearer key).
#[derive(Clone)]
pub struct MailApiNotifier {
    config: NotifyConfig,
    http_client: reqwest::Client,
}

impl MailApiNotifier {
    pub fn new(config: NotifyConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build a notifier only when the configuration enables one.
    pub fn from_config(config: NotifyConfig) -> Result<Option<Arc<dyn LeadNotifier>>> {
        if !config.is_enabled() {
            return Ok(None);
        }
        Ok(Some(Arc::new(Self::new(config)?)))
    }
}

#[async_trait]
impl LeadNotifier for MailApiNotifier {
    async fn notify(&self, record: &LeadRecord) -> Result<()> {
        let (Some(url), Some(to)) = (self.config.api_url.as_deref(), self.config.to.as_deref())
        else {
            return Ok(());
        };

        let mail = LeadNotification::from_record(record);
        let body = serde_json::json!({
            "from": self.config.from.as_deref().unwrap_or(to),
            "to": [to],
            "reply_to": record.lead.email,
            "subject": mail.subject,
            "text": mail.text,
        });

        let mut request = self.http_client.post(url).json(&body);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            Error::upstream(
                UpstreamErrorCode::Transport,
                format!("Mail API unavailable: {}", e),
                None,
            )
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(Error::upstream(
                UpstreamErrorCode::Transport,
                format!("Mail API returned {}", status),
                Some(serde_json::Value::String(body)),
            ));
        }

        Ok(())
    }
}

/// Fire-and-forget notification. The returned handle is only for tests.
pub fn spawn_notification(notifier: Arc<dyn LeadNotifier>, record: LeadRecord) -> JoinHandle<()> {
    tokio::spawn(async move {
        match notifier.notify(&record).await {
            Ok(()) => {
                metrics().notifications_sent.inc();
                info!(lead_id = %record.id, "Lead notification sent");
            }
            Err(e) => {
                metrics().notification_failures.inc();
                warn!(lead_id = %record.id, error = %e, "Lead notification failed");
            }
        }
    })
}
