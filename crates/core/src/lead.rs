//! Lead submission types and the validation gate.
//!
//! Checks run in a fixed order and stop at the first failing stage:
//! 1. Honeypot fields must be empty
//! 2. The form must have been open for at least the minimum age
//! 3. Field rules (all field errors are collected together)

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::clock::SharedClock;
use crate::error::{Error, FieldErrors, Result, ValidationErrorCode};
use crate::limits::{DEFAULT_MIN_FORM_AGE_MS, MAX_SOURCE_LEN};

/// `local@domain.tld` shape only. Deliverability is not our problem.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("invalid email pattern"));

/// Raw POST /api/lead body as sent by the widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,

    // Honeypots
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub fax: Option<String>,

    /// Milliseconds the form was open, as measured by the browser.
    #[serde(default)]
    pub age_ms: Option<i64>,
    /// Epoch milliseconds at which the form was rendered.
    #[serde(default)]
    pub rendered_at: Option<i64>,

    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

impl LeadRequest {
    fn honeypot_tripped(&self) -> bool {
        [&self.website, &self.company_url, &self.fax]
            .into_iter()
            .flatten()
            .any(|v| !v.trim().is_empty())
    }
}

/// A lead that passed every check. All strings are trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[validate(length(min = 2, max = 200, message = "Name must be 2-200 characters"))]
    pub name: String,

    #[validate(
        length(max = 300, message = "Email must be at most 300 characters"),
        custom(function = "validate_email_shape")
    )]
    pub email: String,

    #[validate(length(max = 5000, message = "Message must be at most 5000 characters"))]
    pub message: String,

    pub source: String,

    #[serde(skip_serializing)]
    pub recaptcha_token: Option<String>,
}

fn validate_email_shape(email: &str) -> std::result::Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some(Cow::Borrowed("Invalid email address"));
        Err(err)
    }
}

fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Validation gate for lead submissions.
#[derive(Clone)]
pub struct LeadValidator {
    min_form_age_ms: u64,
    clock: SharedClock,
}

impl LeadValidator {
    pub fn new(min_form_age_ms: u64, clock: SharedClock) -> Self {
        Self {
            min_form_age_ms,
            clock,
        }
    }

    pub fn with_default_age(clock: SharedClock) -> Self {
        Self::new(DEFAULT_MIN_FORM_AGE_MS, clock)
    }

    /// Parse and validate a raw JSON body.
    pub fn validate(&self, raw: &[u8]) -> Result<LeadSubmission> {
        let request: LeadRequest = serde_json::from_slice(raw).map_err(|e| {
            Error::validation(
                ValidationErrorCode::InvalidFormat,
                format!("Invalid JSON body: {}", e),
            )
        })?;
        self.validate_request(request)
    }

    /// Validate an already-deserialized request.
    pub fn validate_request(&self, request: LeadRequest) -> Result<LeadSubmission> {
        if request.honeypot_tripped() {
            return Err(Error::validation(
                ValidationErrorCode::SpamDetected,
                "Spam detected",
            ));
        }

        if let Some(age) = self.form_age_ms(&request) {
            if age < self.min_form_age_ms as i64 {
                return Err(Error::validation(
                    ValidationErrorCode::TooFast,
                    "Form submitted too quickly",
                ));
            }
        }

        let submission = LeadSubmission {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            message: request
                .message
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            source: truncate_chars(
                request.source.as_deref().map(str::trim).unwrap_or_default(),
                MAX_SOURCE_LEN,
            )
            .trim_end()
            .to_string(),
            recaptcha_token: request
                .recaptcha_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
        };

        submission
            .validate()
            .map_err(|e| Error::invalid_fields(collect_field_errors(&e)))?;

        Ok(submission)
    }

    fn form_age_ms(&self, request: &LeadRequest) -> Option<i64> {
        request.age_ms.or_else(|| {
            request
                .rendered_at
                .map(|rendered| {
                    // An age that cannot be represented counts as too fast.
                    i64::try_from(self.clock.now_ms())
                        .ok()
                        .and_then(|now| now.checked_sub(rendered))
                        .unwrap_or(i64::MIN)
                })
        })
    }
}

/// What gets written to the lead sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub lead: LeadSubmission,
    pub submitted_at: DateTime<Utc>,
    pub client_id: String,
}

impl LeadRecord {
    pub fn new(lead: LeadSubmission, client_id: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead,
            submitted_at: DateTime::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now),
            client_id: client_id.into(),
        }
    }
}
