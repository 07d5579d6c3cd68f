//! Mapping of domain failures to HTTP responses

use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::shared::DomainError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn domain_error(err: DomainError) -> ApiError {
    let (status, message) = match &err {
        DomainError::NotFound { entity, .. } => (StatusCode::NOT_FOUND, format!("{entity} not found")),
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        DomainError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        DomainError::Unavailable(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable".to_string())
        }
        DomainError::Database(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal database error".to_string())
        }
    };
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (status, Json(ApiResponse::error(message)))
}

pub fn db_error(err: sea_orm::DbErr) -> ApiError {
    domain_error(err.into())
}
