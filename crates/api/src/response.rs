//! Standardized API responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::error::ValidationErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Success body for POST /api/lead.
#[derive(Debug, Serialize, Deserialize)]
pub struct LeadAccepted {
    pub ok: bool,
}

impl LeadAccepted {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for LeadAccepted {
    fn default() -> Self {
        Self::new()
    }
}

/// Public, browser-safe configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub recaptcha_site_key: Option<String>,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<Value>) -> Self {
        self.details = details;
        self
    }
}

/// API error type carrying a machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
            retry_after: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::BAD_REQUEST,
            ValidationErrorCode::InvalidFormat.code(),
            msg,
        )
    }

    pub fn rate_limited(code: impl Into<String>, msg: impl Into<String>, retry_after: u64) -> Self {
        Self {
            status: StatusCode::TOO_MANY_REQUESTS,
            response: ErrorResponse::new(msg, code),
            retry_after: Some(retry_after),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_001", msg)
    }

    fn details(mut self, details: Option<Value>) -> Self {
        self.response = self.response.with_details(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(retry_after) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }

        response
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<gateway_core::Error> for ApiError {
    fn from(err: gateway_core::Error) -> Self {
        use gateway_core::Error;

        match err {
            Error::Config { code, message, http_status }
            | Error::Verification { code, message, http_status } => {
                ApiError::with_code(status_from(http_status), code, message)
            }
            Error::Validation { code, message, fields } => {
                let details = if fields.is_empty() {
                    None
                } else {
                    serde_json::to_value(&fields).ok()
                };
                ApiError::with_code(StatusCode::BAD_REQUEST, code, message).details(details)
            }
            Error::RateLimit { code, message, retry_after } => {
                ApiError::rate_limited(code, message, retry_after)
            }
            Error::Upstream { code, message, http_status, details } => {
                ApiError::with_code(status_from(http_status), code, message).details(details)
            }
            Error::Serialization(e) => ApiError::bad_request(format!("Invalid JSON: {}", e)),
            Error::Internal(msg) => ApiError::internal(msg),
        }
    }
}
