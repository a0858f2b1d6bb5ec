//! Runtime configuration.
//!
//! Layering: built-in defaults, then `config/default.toml`, then
//! `GATEWAY__SECTION__FIELD` variables, then the flat names operators
//! actually set (`GEMINI_API_KEY`, `PORT`, ...).

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use api::middleware::rate_limit::RateLimitConfig;
use api::LeadPolicy;
use gateway_core::limits::{
    DEFAULT_MIN_FORM_AGE_MS, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_SWEEP_SECS,
    DEFAULT_RATE_LIMIT_WINDOW_MS,
};
use gemini::GeminiConfig;
use leads::{LeadSinkConfig, NotifyConfig, RecaptchaConfig};
use serde::{Deserialize, Serialize};
use url::Url;

/// Lead route rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
}

fn default_window_ms() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_MS
}

fn default_max_requests() -> usize {
    DEFAULT_RATE_LIMIT_MAX
}

fn default_sweep_secs() -> u64 {
    DEFAULT_RATE_LIMIT_SWEEP_SECS
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            sweep_secs: default_sweep_secs(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub recaptcha: RecaptchaConfig,

    #[serde(default)]
    pub lead_sink: LeadSinkConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Minimum time a form must be open before submission
    #[serde(default = "default_min_form_age_ms")]
    pub min_form_age_ms: u64,

    /// Widget assets served for unmatched paths
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_min_form_age_ms() -> u64 {
    DEFAULT_MIN_FORM_AGE_MS
}

fn default_static_dir() -> String {
    "public".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            gemini: GeminiConfig::default(),
            recaptcha: RecaptchaConfig::default(),
            lead_sink: LeadSinkConfig::default(),
            notify: NotifyConfig::default(),
            rate_limit: RateLimitSettings::default(),
            min_form_age_ms: default_min_form_age_ms(),
            static_dir: default_static_dir(),
        }
    }
}

impl Settings {
    pub fn lead_policy(&self) -> LeadPolicy {
        LeadPolicy {
            rate_limit: RateLimitConfig {
                window_ms: self.rate_limit.window_ms,
                max_requests: self.rate_limit.max_requests,
            },
            sweep_interval: Duration::from_secs(self.rate_limit.sweep_secs),
            min_form_age_ms: self.min_form_age_ms,
        }
    }

    /// Reject values that would only fail later, mid-request.
    pub fn validate(&self) -> Result<()> {
        check_url("gemini.base_url", &self.gemini.base_url)?;
        check_url("recaptcha.verify_url", &self.recaptcha.verify_url)?;
        if let Some(url) = self.lead_sink.url.as_deref().filter(|u| !u.trim().is_empty()) {
            check_url("lead_sink.url", url)?;
        }
        if let Some(url) = self.notify.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
            check_url("notify.api_url", url)?;
        }

        if self.rate_limit.window_ms == 0 {
            bail!("rate_limit.window_ms must be positive");
        }
        if self.rate_limit.max_requests == 0 {
            bail!("rate_limit.max_requests must be positive");
        }
        if self.rate_limit.sweep_secs == 0 {
            bail!("rate_limit.sweep_secs must be positive");
        }
        if !(0.0..=1.0).contains(&self.recaptcha.min_score) {
            bail!(
                "recaptcha.min_score must be between 0 and 1, got {}",
                self.recaptcha.min_score
            );
        }

        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<()> {
    Url::parse(value).with_context(|| format!("{} is not a valid URL: {:?}", field, value))?;
    Ok(())
}

/// Load configuration from files and environment.
pub fn load() -> Result<Settings> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Settings::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("GATEWAY")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut settings: Settings = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok())?;
    Ok(settings)
}

fn set_parsed<T>(target: &mut T, name: &str, raw: Option<String>) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = raw {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw))?;
    }
    Ok(())
}

/// Flat environment names take precedence over everything else.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let text = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(host) = text("HOST") {
        settings.host = host;
    }
    set_parsed(&mut settings.port, "PORT", text("PORT"))?;

    // Gemini
    if let Some(key) = text("GEMINI_API_KEY") {
        settings.gemini.api_key = Some(key);
    }
    if let Some(model) = text("GEMINI_CHAT_MODEL") {
        settings.gemini.chat_model = model;
    }
    if let Some(model) = text("GEMINI_TTS_MODEL") {
        settings.gemini.tts_model = model;
    }
    if let Some(voice) = text("GEMINI_TTS_VOICE") {
        settings.gemini.tts_voice = voice;
    }
    if let Some(url) = text("GEMINI_BASE_URL") {
        settings.gemini.base_url = url;
    }

    // Lead policy
    set_parsed(&mut settings.rate_limit.window_ms, "RATE_LIMIT_WINDOW_MS", text("RATE_LIMIT_WINDOW_MS"))?;
    set_parsed(&mut settings.rate_limit.max_requests, "RATE_LIMIT_MAX", text("RATE_LIMIT_MAX"))?;
    set_parsed(&mut settings.rate_limit.sweep_secs, "RATE_LIMIT_SWEEP_SECS", text("RATE_LIMIT_SWEEP_SECS"))?;
    set_parsed(&mut settings.min_form_age_ms, "MIN_FORM_AGE_MS", text("MIN_FORM_AGE_MS"))?;

    // Recaptcha
    if let Some(secret) = text("RECAPTCHA_SECRET") {
        settings.recaptcha.secret = Some(secret);
    }
    if let Some(site_key) = text("RECAPTCHA_SITE_KEY") {
        settings.recaptcha.site_key = Some(site_key);
    }
    set_parsed(&mut settings.recaptcha.min_score, "RECAPTCHA_MIN_SCORE", text("RECAPTCHA_MIN_SCORE"))?;
    if let Some(action) = text("RECAPTCHA_ACTION") {
        settings.recaptcha.expected_action = action;
    }
    if let Some(url) = text("RECAPTCHA_VERIFY_URL") {
        settings.recaptcha.verify_url = url;
    }

    // Lead sink and notification
    if let Some(url) = text("LEAD_SINK_URL") {
        settings.lead_sink.url = Some(url);
    }
    if let Some(url) = text("NOTIFY_API_URL") {
        settings.notify.api_url = Some(url);
    }
    if let Some(key) = text("NOTIFY_API_KEY") {
        settings.notify.api_key = Some(key);
    }
    if let Some(from) = text("NOTIFY_FROM") {
        settings.notify.from = Some(from);
    }
    if let Some(to) = text("NOTIFY_TO") {
        settings.notify.to = Some(to);
    }

    if let Some(dir) = text("STATIC_DIR") {
        settings.static_dir = dir;
    }

    Ok(())
}
