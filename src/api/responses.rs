//! Standardized HTTP response types for the hostreg API: RFC 7807
//! problem-details errors and a liveness-probe health response, kept
//! close to the teacher's `api/responses.rs` (trimmed of the HAL,
//! pagination and webhook-signing machinery that has no counterpart in
//! a host-registry API).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;

/// API error following RFC 7807 Problem Details, exactly as the teacher's
/// `ApiError` shapes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub code: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let code_str = code.into();
        Self {
            type_: format!("https://hostreg.internal/errors/{}", code_str),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: None,
            code: code_str,
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Bad Request", detail)
    }

    pub fn not_found(resource: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut error = Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource Not Found", detail);
        error.instance = Some(format!("/host/{}", resource.into()));
        error
    }

    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal Server Error",
            detail,
        )
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

/// Maps the registry core's error enum onto the HTTP boundary (§7):
/// `UnknownHost` -> 404, `InvalidClass` -> 400, `IndexCorruption` and
/// `RuntimeDriver` -> 500 (logged at `error` level since they signal a
/// programming bug or an external-system failure, not bad input).
impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::UnknownHost(ip) => ApiError::not_found(ip.clone(), err.to_string()),
            RegistryError::InvalidClass(_) => ApiError::bad_request(err.to_string()),
            RegistryError::IndexCorruption { .. } => {
                tracing::error!(error = %err, "classified index invariant violated");
                ApiError::internal_error(err.to_string())
            }
            RegistryError::RuntimeDriver(_) => {
                tracing::error!(error = %err, "runtime driver invocation failed");
                ApiError::internal_error(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Liveness probe response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealthStatus {
    Healthy,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            version: crate::VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
