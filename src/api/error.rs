//! Error to HTTP response mapping.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::TotalMismatch { .. }
            | Self::DuplicateSlug { .. }
            | Self::CategoryInUse { .. } => StatusCode::BAD_REQUEST,
            Self::OrderNotFound { .. }
            | Self::MenuNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::DishNotFound { .. }
            | Self::NoReportData { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Export(_)
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
