//! HTTP error response handling for the API
//!
//! Maps domain errors to the wire shapes clients of this service expect:
//! a lookup miss is JSON with `error`/`message` fields, a missing served
//! file is JSON with a `detail` field, and everything else is the raw error
//! text with its mapped status code.

use crate::error::{Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Convert errors to HTTP responses so handlers can return `Result<_, Error>`
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            Error::AttachmentNotFound { .. } => (
                status,
                Json(json!({
                    "error": self.error_code(),
                    "message": self.to_string(),
                })),
            )
                .into_response(),

            Error::FileNotFound { .. } => {
                (status, Json(json!({ "detail": "File not found" }))).into_response()
            }

            _ => (status, self.to_string()).into_response(),
        }
    }
}
