//! Log output for the gateway.
//!
//! `RUST_LOG` selects the filter and `LOG_JSON` switches to one JSON object
//! per line. Credentials are only ever logged through [`Redacted`].

use std::fmt;

use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when `RUST_LOG` is unset or does not parse. Connection-level chatter
/// from the HTTP stack stays at `warn`.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LogSettings {
    /// Resolve from a variable lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = lookup("RUST_LOG")
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = match lookup("LOG_JSON") {
            Some(v) if parse_flag(&v) => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self { filter, format }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. A second call leaves the first one in place.
pub fn init_tracing(settings: &LogSettings) {
    let registry = tracing_subscriber::registry().with(settings.env_filter());

    let installed = match settings.format {
        LogFormat::Json => registry
            .with(
                fmt_layer::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt_layer::layer().with_target(true))
            .try_init(),
    };

    match installed {
        Ok(()) => tracing::info!(
            filter = %settings.filter,
            json = settings.format == LogFormat::Json,
            "Tracing initialized"
        ),
        Err(e) => tracing::debug!(error = %e, "Tracing already initialized"),
    }
}

/// Initialize tracing from `RUST_LOG` and `LOG_JSON`.
pub fn init_tracing_from_env() {
    init_tracing(&LogSettings::from_env());
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Logs whether a credential is present, never its value.
///
/// ```
/// use telemetry::Redacted;
/// assert_eq!(Redacted(Some("AIza-secret")).to_string(), "set");
/// assert_eq!(Redacted(None).to_string(), "unset");
/// ```
#[derive(Clone, Copy)]
pub struct Redacted<'a>(pub Option<&'a str>);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.map(str::trim) {
            Some(v) if !v.is_empty() => f.write_str("set"),
            _ => f.write_str("unset"),
        }
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
