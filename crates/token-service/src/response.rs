//! Uniform `{token, code}` response envelope.
//!
//! Success and failure share one shape. The `token` field carries either the
//! signed token or a human-readable error message, and `code` is the HTTP
//! status as a string. Callers tell the two apart by status code alone.

use crate::models::TokenResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Encode `message` as a JSON envelope with the given status.
///
/// CORS headers are applied to every response by the router, not here.
pub fn token_envelope(message: impl Into<String>, status: StatusCode) -> Response {
    let body = TokenResponse {
        token: message.into(),
        code: status.as_u16().to_string(),
    };

    (status, Json(body)).into_response()
}
