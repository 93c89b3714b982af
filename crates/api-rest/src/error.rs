use api_shared::{ErrorEnvelope, LookupError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use coeus_core::CoreError;

/// Errors returned by REST handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// User-facing lookup failure rendered as `{error, error_code}`.
    #[error("{}", .1.error)]
    Lookup(StatusCode, LookupError),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn more_input_required() -> Self {
        ApiError::Lookup(
            StatusCode::BAD_REQUEST,
            LookupError::new("More input required", "bad_request"),
        )
    }

    pub fn patient_not_found() -> Self {
        ApiError::Lookup(
            StatusCode::NOT_FOUND,
            LookupError::new("No patient found", "patient_not_found"),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Lookup(status, body) => (status, Json(body)).into_response(),
            ApiError::Validation(message) | ApiError::Core(CoreError::Validation(message)) => {
                tracing::warn!("bad_request - {message}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorEnvelope::new(400, message, "bad_request")),
                )
                    .into_response()
            }
            ApiError::Core(e) => {
                if e.is_transport() {
                    tracing::error!(upstream_status = ?e.upstream_status(), "server_error - {e}");
                } else {
                    tracing::error!("server_error - {e}");
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorEnvelope::server_error()),
                )
                    .into_response()
            }
        }
    }
}
