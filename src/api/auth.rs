//! Authentication middleware for the REST API
//!
//! Provides optional static bearer-token authentication. When
//! `ServerConfig::auth_token` is set, every request must carry a matching
//! `Authorization: Bearer <token>` header or it receives 401 Unauthorized.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Middleware that checks the Authorization header against a static token.
///
/// Returns 401 Unauthorized when the header is missing, not a Bearer scheme,
/// or carries a different token; otherwise the request proceeds.
pub async fn require_bearer_token(
    State(expected_token): State<Option<String>>,
    request: Request,
    next: Next,
) -> Response {
    // No token configured means the API is open.
    let Some(expected) = expected_token else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => unauthorized_response("Invalid bearer token"),
        None => unauthorized_response("Missing Authorization: Bearer header"),
    }
}

/// Constant-time byte comparison to prevent timing side-channel attacks.
/// Always compares all bytes regardless of where the first mismatch occurs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

fn unauthorized_response(message: &str) -> Response {
    let body = Json(json!({
        "error": "unauthorized",
        "message": message
    }));

    (StatusCode::UNAUTHORIZED, body).into_response()
}
