//! Error taxonomy: service-layer errors raised by the mutation pipeline and
//! their mapping onto structured HTTP responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed while servicing the request.
    #[error("storage failure")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// No admin identity could be established for the caller.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// An identity was presented but lacks the admin role.
    #[error("access denied: {0}")]
    Forbidden(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Energy increment attempted after the locker finished unlocking.
    #[error("unlock complete - no further increments allowed")]
    UnlockComplete,
    /// Conditional update matched zero rows: the row changed between the
    /// fetch and the write.
    #[error("conflict: {0}")]
    WriteConflict(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(flatten_validation_errors(&err))
    }
}

/// Collapse nested validator output into a single human-readable line the
/// admin UI can surface as a toast.
fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    for (field, kinds) in errors.errors() {
        collect_messages(field, kinds, &mut messages);
    }
    if messages.is_empty() {
        "validation failed".to_string()
    } else {
        messages.join("; ")
    }
}

fn collect_messages(field: &str, kind: &validator::ValidationErrorsKind, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;
    match kind {
        ValidationErrorsKind::Field(list) => {
            for error in list {
                match &error.message {
                    Some(message) => out.push(message.to_string()),
                    None => out.push(format!("invalid value for `{field}`")),
                }
            }
        }
        ValidationErrorsKind::Struct(nested) => {
            for (inner_field, inner_kind) in nested.errors() {
                collect_messages(inner_field, inner_kind, out);
            }
        }
        ValidationErrorsKind::List(map) => {
            for nested in map.values() {
                for (inner_field, inner_kind) in nested.errors() {
                    collect_messages(inner_field, inner_kind, out);
                }
            }
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// No credentials, or credentials nobody recognises.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not an admin.
    #[error("{0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Concurrent modification detected by the conditional write.
    #[error("{0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::Internal(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::Forbidden(message) => AppError::Forbidden(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::UnlockComplete => {
                AppError::BadRequest("unlock complete - no further increments allowed".into())
            }
            ServiceError::WriteConflict(message) => AppError::Conflict(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            success: false,
            error: self.to_string(),
        });

        (status, payload).into_response()
    }
}
