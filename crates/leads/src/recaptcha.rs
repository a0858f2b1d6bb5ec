//! Score-based bot verification.

use std::time::Duration;

use gateway_core::error::VerificationErrorCode;
use gateway_core::limits::UNKNOWN_CLIENT;
use gateway_core::{Error, Result};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::config::RecaptchaConfig;

/// Response of the `siteverify` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// Apply the threshold policy to a verifier response.
///
/// Score and action are only checked when the verifier returns them.
pub fn evaluate(response: &SiteVerifyResponse, min_score: f64, expected_action: &str) -> Result<()> {
    if !response.success {
        return Err(Error::verification(
            VerificationErrorCode::NotSuccessful,
            "Recaptcha check not successful",
        ));
    }

    if let Some(score) = response.score {
        if score < min_score {
            return Err(Error::verification(
                VerificationErrorCode::LowScore,
                "Recaptcha score too low",
            ));
        }
    }

    if let Some(action) = response.action.as_deref() {
        if action != expected_action {
            return Err(Error::verification(
                VerificationErrorCode::UnexpectedAction,
                "Recaptcha action mismatch",
            ));
        }
    }

    Ok(())
}

/// Calls the verification endpoint and applies [`evaluate`].
#[derive(Clone)]
pub struct RecaptchaVerifier {
    config: RecaptchaConfig,
    http_client: reqwest::Client,
}

impl RecaptchaVerifier {
    pub fn new(config: RecaptchaConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &RecaptchaConfig {
        &self.config
    }

    /// False when no secret is configured; `verify` then always succeeds.
    pub fn is_enabled(&self) -> bool {
        self.config.secret().is_some()
    }

    /// Verify a browser token. Success has no side effect.
    pub async fn verify(&self, token: Option<&str>, client_ip: Option<&str>) -> Result<()> {
        let Some(secret) = self.config.secret() else {
            debug!("Recaptcha disabled, skipping verification");
            return Ok(());
        };

        let token = token.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            metrics().recaptcha_rejections.inc();
            return Err(Error::verification(
                VerificationErrorCode::MissingToken,
                "Missing recaptcha token",
            ));
        }

        let mut form = vec![("secret", secret), ("response", token)];
        if let Some(ip) = client_ip.filter(|ip| *ip != UNKNOWN_CLIENT) {
            form.push(("remoteip", ip));
        }

        let response = self
            .http_client
            .post(&self.config.verify_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Recaptcha request failed");
                Error::verification(
                    VerificationErrorCode::Unavailable,
                    format!("Recaptcha verification unavailable: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Recaptcha endpoint returned error");
            return Err(Error::verification(
                VerificationErrorCode::Unavailable,
                format!("Recaptcha endpoint returned {}", status),
            ));
        }

        let verdict: SiteVerifyResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse recaptcha response");
            Error::verification(
                VerificationErrorCode::Unavailable,
                format!("Invalid recaptcha response: {}", e),
            )
        })?;

        debug!(
            success = verdict.success,
            score = ?verdict.score,
            action = ?verdict.action,
            "Recaptcha verdict"
        );

        evaluate(&verdict, self.config.min_score, &self.config.expected_action).map_err(|e| {
            metrics().recaptcha_rejections.inc();
            warn!(error_codes = ?verdict.error_codes, error = %e, "Recaptcha rejected submission");
            e
        })
    }
}
