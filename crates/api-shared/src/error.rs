//! Error bodies shared by the HTTP handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic error envelope for unhandled failures and unknown routes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    pub message: String,
    /// Machine-readable error code, e.g. `server_error`.
    pub code: String,
    /// Always `false`.
    pub success: bool,
}

impl ErrorEnvelope {
    pub fn new(status: u16, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            success: false,
        }
    }

    /// 500 envelope for unexpected failures.
    pub fn server_error() -> Self {
        Self::new(500, "Internal server error", "server_error")
    }

    /// 404 envelope for unknown routes.
    pub fn route_not_found() -> Self {
        Self::new(404, "Not Found", "route_not_found")
    }
}

/// Body returned by lookup endpoints for user-facing failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LookupError {
    pub error: String,
    pub error_code: String,
}

impl LookupError {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}
