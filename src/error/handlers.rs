//! Error handlers
//!
//! Maps `FsError` onto HTTP status codes and JSON error bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use serde_json::json;

use crate::error::types::FsError;

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &FsError) -> StatusCode {
    match err {
        FsError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        FsError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        FsError::NotFound(_) => StatusCode::NOT_FOUND,
        FsError::AlreadyExists(_) => StatusCode::CONFLICT,
        FsError::NotADirectory(_)
        | FsError::DirectoryNotEmpty(_)
        | FsError::EditMismatch(_)
        | FsError::InvalidToken
        | FsError::Expired
        | FsError::ParameterMismatch
        | FsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FsError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Log an error at a level matching its severity
pub fn handle_error(err: &FsError) {
    match err {
        FsError::Io(e) => error!("Unexpected I/O failure: {}", e),
        other => warn!("Request rejected: {}", other),
    }
}

impl IntoResponse for FsError {
    fn into_response(self) -> Response {
        handle_error(&self);

        let status = error_to_status_code(&self);
        let message = match &self {
            // Raw OS detail stays in the log
            FsError::Io(_) => "Internal file system error".to_string(),
            other => other.to_string(),
        };

        let mut body = json!({
            "error": true,
            "message": message,
            "status": status.as_u16(),
            "error_code": self.code(),
        });

        if let FsError::AccessDenied { allowed, .. } = &self {
            body["allowed_directories"] = json!(allowed);
        }

        (status, Json(body)).into_response()
    }
}
