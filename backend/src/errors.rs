use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    #[error("Invalid purchase price: {0}")]
    InvalidPrice(f64),
}

/// Errors raised by text-generation providers
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Rate limited by LLM provider")]
    RateLimited,
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_)
            | AppError::MalformedResponse(_)
            | AppError::InvalidPrice(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<PriceProviderError> for AppError {
    fn from(value: PriceProviderError) -> Self {
        match value {
            PriceProviderError::Parse(msg) | PriceProviderError::BadResponse(msg) => {
                AppError::MalformedResponse(msg)
            }
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(value: LlmError) -> Self {
        match value {
            LlmError::InvalidResponse(msg) => AppError::MalformedResponse(msg),
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}
