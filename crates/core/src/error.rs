//! Unified error types for the gateway.
//!
//! Error codes:
//! - CONFIG_001-002: Missing configuration
//! - VALID_001-004: Request and lead validation errors
//! - RATE_001: Rate limit errors
//! - CAPTCHA_001-005: Recaptcha verification errors
//! - UPSTREAM_001-005: Errors from external providers

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Configuration error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// CONFIG_001: Generative-language API key is not set
    MissingApiKey,
    /// CONFIG_002: Lead sink endpoint is not set
    MissingLeadSink,
}

impl ConfigErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "CONFIG_001",
            Self::MissingLeadSink => "CONFIG_002",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::MissingApiKey => 400,
            Self::MissingLeadSink => 500,
        }
    }
}

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Malformed body or empty required input
    InvalidFormat,
    /// VALID_002: Honeypot field was filled in
    SpamDetected,
    /// VALID_003: Form submitted faster than a human could fill it
    TooFast,
    /// VALID_004: One or more lead fields are invalid
    InvalidFields,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::SpamDetected => "VALID_002",
            Self::TooFast => "VALID_003",
            Self::InvalidFields => "VALID_004",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        400
    }
}

/// Rate limit error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitErrorCode {
    /// RATE_001: Rate limit exceeded
    Exceeded,
}

impl RateLimitErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Exceeded => "RATE_001",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        429
    }
}

/// Recaptcha verification error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationErrorCode {
    /// CAPTCHA_001: No token supplied while verification is enabled
    MissingToken,
    /// CAPTCHA_002: Verifier reported failure
    NotSuccessful,
    /// CAPTCHA_003: Score below the configured minimum
    LowScore,
    /// CAPTCHA_004: Token was issued for a different action
    UnexpectedAction,
    /// CAPTCHA_005: Verifier could not be reached
    Unavailable,
}

impl VerificationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "CAPTCHA_001",
            Self::NotSuccessful => "CAPTCHA_002",
            Self::LowScore => "CAPTCHA_003",
            Self::UnexpectedAction => "CAPTCHA_004",
            Self::Unavailable => "CAPTCHA_005",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unavailable => 500,
            _ => 400,
        }
    }
}

/// Upstream error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorCode {
    /// UPSTREAM_001: Chat model returned an error
    Chat,
    /// UPSTREAM_002: Speech model returned an error
    Tts,
    /// UPSTREAM_003: Lead sink returned an error
    LeadSink,
    /// UPSTREAM_004: Speech response carried no audio
    MissingAudio,
    /// UPSTREAM_005: Upstream could not be reached or answered garbage
    Transport,
}

impl UpstreamErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chat => "UPSTREAM_001",
            Self::Tts => "UPSTREAM_002",
            Self::LeadSink => "UPSTREAM_003",
            Self::MissingAudio => "UPSTREAM_004",
            Self::Transport => "UPSTREAM_005",
        }
    }

    /// Get the HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Chat | Self::Tts | Self::LeadSink => 502,
            Self::MissingAudio | Self::Transport => 500,
        }
    }
}

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// Required credential or endpoint missing.
    #[error("[{code}] {message}")]
    Config {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Malformed or bot-like input.
    #[error("[{code}] {message}")]
    Validation {
        code: &'static str,
        message: String,
        fields: FieldErrors,
    },

    /// Rate limit error with code.
    #[error("[{code}] {message}")]
    RateLimit {
        code: &'static str,
        message: String,
        retry_after: u64,
    },

    /// Recaptcha rejection.
    #[error("[{code}] {message}")]
    Verification {
        code: &'static str,
        message: String,
        http_status: u16,
    },

    /// Non-success response from a dependency. `details` carries the raw payload.
    #[error("[{code}] {message}")]
    Upstream {
        code: &'static str,
        message: String,
        http_status: u16,
        details: Option<serde_json::Value>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(code: ConfigErrorCode, msg: impl Into<String>) -> Self {
        Self::Config {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create a validation error without field detail.
    pub fn validation(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::Validation {
            code: code.code(),
            message: msg.into(),
            fields: FieldErrors::new(),
        }
    }

    /// Create a validation error carrying per-field messages.
    pub fn invalid_fields(fields: FieldErrors) -> Self {
        Self::Validation {
            code: ValidationErrorCode::InvalidFields.code(),
            message: "Validation failed".to_string(),
            fields,
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(code: RateLimitErrorCode, msg: impl Into<String>, retry_after: u64) -> Self {
        Self::RateLimit {
            code: code.code(),
            message: msg.into(),
            retry_after,
        }
    }

    /// Create a verification error.
    pub fn verification(code: VerificationErrorCode, msg: impl Into<String>) -> Self {
        Self::Verification {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
        }
    }

    /// Create an upstream error.
    pub fn upstream(
        code: UpstreamErrorCode,
        msg: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self::Upstream {
            code: code.code(),
            message: msg.into(),
            http_status: code.http_status(),
            details,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Config { http_status, .. } => *http_status,
            Self::Validation { .. } => 400,
            Self::RateLimit { .. } => 429,
            Self::Verification { http_status, .. } => *http_status,
            Self::Upstream { http_status, .. } => *http_status,
            Self::Serialization(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Config { code, .. } => Some(code),
            Self::Validation { code, .. } => Some(code),
            Self::RateLimit { code, .. } => Some(code),
            Self::Verification { code, .. } => Some(code),
            Self::Upstream { code, .. } => Some(code),
            _ => None,
        }
    }
}
