//! HTTP request handlers for the token service.

pub mod health;
pub mod metrics;
pub mod method;
pub mod rtc_token;
pub mod rtm_token;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use method::{preflight, unsupported_method};
pub use rtc_token::handle_rtc_token;
pub use rtm_token::handle_rtm_token;

use crate::errors::TokenServiceError;
use crate::observability::metrics::{record_token_error, record_token_issuance};
use crate::response::token_envelope;
use crate::services::token_service::IssuedToken;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Instant;

/// Unwrap the buffered request body.
///
/// A body that could not be read (over the body size limit, or the
/// connection failed mid-stream) is answered like any other undecodable
/// body, inside the token envelope.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, TokenServiceError> {
    body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Request body rejected");
        TokenServiceError::MalformedBody
    })
}

/// Record the outcome of a token request and turn it into a response.
fn complete_issuance(
    kind: &'static str,
    start: Instant,
    result: Result<IssuedToken, TokenServiceError>,
) -> Result<Response, TokenServiceError> {
    let duration = start.elapsed();
    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);
    record_token_issuance(kind, status, duration);

    match result {
        Ok(issued) => {
            tracing::debug!(expire_at = issued.expire_at, "Token issued");
            Ok(token_envelope(issued.token, StatusCode::OK))
        }
        Err(e) => {
            tracing::debug!(error_type = e.error_type(), "Token request rejected");
            record_token_error(kind, e.error_type(), e.status_code());
            Err(e)
        }
    }
}
