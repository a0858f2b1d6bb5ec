//! Lead-capture configuration.

use serde::{Deserialize, Serialize};

/// Score-based bot verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecaptchaConfig {
    /// Server-side secret. Verification is skipped when unset.
    #[serde(default)]
    pub secret: Option<String>,
    /// Public key handed to the browser via `/api/config`
    #[serde(default)]
    pub site_key: Option<String>,
    /// Lowest accepted score
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// Action name the token must have been issued for
    #[serde(default = "default_action")]
    pub expected_action: String,
    /// Verification endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_min_score() -> f64 {
    0.5
}

fn default_action() -> String {
    "lead".to_string()
}

fn default_verify_url() -> String {
    "https://www.google.com/recaptcha/api/siteverify".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RecaptchaConfig {
    fn default() -> Self {
        Self {
            secret: None,
            site_key: None,
            min_score: default_min_score(),
            expected_action: default_action(),
            verify_url: default_verify_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RecaptchaConfig {
    /// The secret, if one is set and not blank.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Spreadsheet endpoint that stores leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSinkConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LeadSinkConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Optional e-mail notification sent through an HTTP mail API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from: None,
            to: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NotifyConfig {
    /// Notifications are on only when an endpoint and a recipient are set.
    pub fn is_enabled(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.api_url) && set(&self.to)
    }
}
