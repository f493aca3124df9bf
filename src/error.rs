//! Domain-specific error types for career-predictor

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const QUOTA_MESSAGE: &str = "AI credits exhausted. Please contact support.";

/// Every way a prediction (or chat relay) request can fail
#[derive(Error, Debug)]
pub enum PredictionError {
    /// Missing or unusable credential/settings. Raised before any network I/O.
    #[error("{message}")]
    Configuration { message: String },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits exhausted. Please contact support.")]
    QuotaExhausted,

    /// Non-success upstream status, or a transport failure (`status` is None).
    #[error("{message}")]
    UpstreamFailure { status: Option<u16>, message: String },

    /// Upstream answered 2xx but the content could not be decoded.
    #[error("Failed to parse AI response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl PredictionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PredictionError::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        PredictionError::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        PredictionError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Classify a non-success upstream status
    pub fn from_upstream_status(status: u16) -> Self {
        match status {
            429 => PredictionError::RateLimited,
            402 => PredictionError::QuotaExhausted,
            other => PredictionError::UpstreamFailure {
                status: Some(other),
                message: format!("AI API error: {other}"),
            },
        }
    }

    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            PredictionError::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            PredictionError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            PredictionError::Configuration { .. }
            | PredictionError::UpstreamFailure { .. }
            | PredictionError::MalformedResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether resubmitting the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PredictionError::RateLimited
                | PredictionError::UpstreamFailure { .. }
                | PredictionError::MalformedResponse { .. }
        )
    }

    /// Short stable label, used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Configuration { .. } => "configuration",
            PredictionError::RateLimited => "rate_limited",
            PredictionError::QuotaExhausted => "quota_exhausted",
            PredictionError::UpstreamFailure { .. } => "upstream_failure",
            PredictionError::MalformedResponse { .. } => "malformed_response",
            PredictionError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Message placed in the `{error}` body. The raw model reply stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            PredictionError::MalformedResponse { .. } => "Failed to parse AI response".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PredictionError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("AI API request timed out: {err}")
        } else {
            format!("AI API request failed: {err}")
        };
        PredictionError::UpstreamFailure {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }
}

impl From<serde_json::Error> for PredictionError {
    fn from(err: serde_json::Error) -> Self {
        PredictionError::InvalidRequest {
            message: err.to_string(),
        }
    }
}

/// Convert PredictionError to the `{error}` JSON body
impl IntoResponse for PredictionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut resp = (status, Json(json!({ "error": self.public_message() }))).into_response();
        resp.extensions_mut().insert(ErrorKind(self.kind()));
        resp
    }
}

/// Response extension read by the metrics middleware
#[derive(Debug, Clone, Copy)]
pub struct ErrorKind(pub &'static str);

/// Result type alias for prediction operations
pub type Result<T> = std::result::Result<T, PredictionError>;
