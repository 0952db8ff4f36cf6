//! HTTP error responses.

use crate::service::{ServiceError, Stage};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::GatewayError;
use serde::Serialize;

/// Error returned by handlers, rendered as `{"error": {...}}`
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error_type: String,
    message: String,
    stage: Option<Stage>,
    upstream_status: Option<u16>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    error_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl ApiError {
    /// Build an error with an explicit status and type
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            stage: None,
            upstream_status: None,
        }
    }

    /// 400 for malformed input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    /// HTTP status
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Error type tag
    #[must_use]
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Failing stage, when the error came from the orchestrator
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            error_type: error.error_type().to_string(),
            message: error.to_string(),
            stage: None,
            upstream_status: error.upstream_status(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        let stage = error.stage;
        Self {
            stage: Some(stage),
            ..Self::from(error.error)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorEnvelope {
            error: ErrorBody {
                message: &self.message,
                error_type: &self.error_type,
                stage: self.stage,
                upstream_status: self.upstream_status,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
