use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use stockarium_auth::{AuthzError, DirectoryError, TokenError};
use stockarium_core::DomainError;
use stockarium_local::StorageError;

/// Every failure a handler can return, mapped to `{error, message}` JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        match self {
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", message),
            ApiError::Directory(e) => match e {
                DirectoryError::UsernameTaken(_) => json_error(StatusCode::CONFLICT, "username_taken", message),
                DirectoryError::InvalidCredentials => {
                    json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", message)
                }
                DirectoryError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
                DirectoryError::Hash(_) => {
                    tracing::error!(error = %message, "password hashing failed");
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
                }
            },
            ApiError::Token(_) => {
                tracing::error!(error = %message, "token issuing failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
            ApiError::Storage(_) => {
                tracing::error!(error = %message, "storage failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "failed to persist changes")
            }
            ApiError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Task(_) => {
                tracing::error!(error = %message, "blocking task failed");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
            }
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
