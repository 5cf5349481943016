//! Shared HTTP plumbing: response envelope, error mapping, extractors

mod validated_json;

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::application::ContainerError;
use crate::domain::DomainError;

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message)))
}

/// Map a domain failure to its HTTP status. Storage failures are logged and
/// reported without their details.
pub fn domain_error(e: DomainError) -> ApiError {
    let status = match &e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthorized(_) | DomainError::AccountLocked { .. } => {
            StatusCode::UNAUTHORIZED
        }
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) | DomainError::InvalidTransition { .. } => StatusCode::CONFLICT,
        DomainError::Database(msg) => {
            error!(error = %msg, "Storage failure while handling request");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
        DomainError::Internal(msg) => {
            error!(error = %msg, "Internal failure while handling request");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    api_error(status, e.to_string())
}

pub fn container_error(e: ContainerError) -> ApiError {
    error!(error = %e, "Service lookup failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn not_found(entity: &str, id: i32) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        format!("{} {} not found", entity, id),
    )
}
