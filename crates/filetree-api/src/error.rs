//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use filetree_core::error::{AppError, ErrorKind};

/// Error body understood by the file manager client.
///
/// Every failure is reported with status 500; `code` carries the kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `true`.
    pub invalid: bool,
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
}

/// HTTP-facing wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>` and use `?` on service calls; the
/// conversion from `AppError` is implicit.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        match err.kind {
            ErrorKind::Database | ErrorKind::Storage | ErrorKind::Internal => {
                tracing::error!(kind = %err.kind, error = %err, "Request failed");
            }
            _ => {
                tracing::debug!(kind = %err.kind, error = %err.message, "Request rejected");
            }
        }

        let body = ApiErrorResponse {
            invalid: true,
            code: err.kind.to_string(),
            error: err.message,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
