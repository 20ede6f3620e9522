use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::ServiceError;

/// API error types that can be returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("No data available: {0}")]
    DataUnavailable(String),

    #[error("Model not initialized. Call /api/v1/initialize first")]
    NotInitialized,

    #[error("Upstream weather source error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Error response that gets serialized to JSON.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::DataUnavailable(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::NotInitialized => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::DataUnavailable(_) => "DataUnavailable",
            ApiError::NotInitialized => "NotInitialized",
            ApiError::Upstream(_) => "UpstreamError",
            ApiError::InternalError(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::InternalError(_) => {
                tracing::error!(error = %self, "API error occurred");
                "An internal error occurred".to_string()
            }
            ApiError::Upstream(_) => {
                tracing::warn!(error = %self, "upstream source failed");
                self.to_string()
            }
            _ => {
                tracing::debug!(error = %self, "client error");
                self.to_string()
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::DataUnavailable(msg) => ApiError::DataUnavailable(msg),
            ServiceError::NotInitialized => ApiError::NotInitialized,
            ServiceError::ModelMissing(attr) => {
                ApiError::NotFound(format!("no trained model for {attr}"))
            }
            ServiceError::MalformedInput(msg) => ApiError::BadRequest(msg),
            ServiceError::Internal(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::InternalError(error.to_string())
    }
}
