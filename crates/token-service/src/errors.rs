//! Token service error types.
//!
//! Every error maps to an HTTP status and, apart from
//! [`TokenServiceError::UnsupportedMethod`], is rendered through the same
//! `{token, code}` envelope as a successful response. Signer internals are
//! logged server-side; clients only see a generic message.

use crate::response::token_envelope;
use crate::signer::SignerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Plain-text body for requests with a method other than POST or OPTIONS.
pub const UNSUPPORTED_METHOD_MESSAGE: &str = "Unsupported method. Please check.\n";

/// Token service error type.
///
/// Maps to HTTP status codes:
/// - MalformedBody, WrongFieldType, UnknownRole, InvalidField: 400 Bad Request
/// - Signer(InvalidInput): 400 Bad Request
/// - Signer(Internal), Internal: 500 Internal Server Error
/// - UnsupportedMethod: 404 Not Found (plain text)
#[derive(Debug, Error)]
pub enum TokenServiceError {
    #[error("Bad request.")]
    MalformedBody,

    #[error(
        "Bad request. Wrong type provided for field {field} of {container}: got {value}, expected {expected}"
    )]
    WrongFieldType {
        value: String,
        field: &'static str,
        container: &'static str,
        expected: &'static str,
    },

    #[error("Bad request. Unknown role {0}")]
    UnknownRole(u32),

    #[error("Bad request. Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Unsupported method")]
    UnsupportedMethod,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TokenServiceError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Bounded label for the `error_type` metric dimension.
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenServiceError::MalformedBody => "malformed_body",
            TokenServiceError::WrongFieldType { .. } => "wrong_field_type",
            TokenServiceError::UnknownRole(_) => "unknown_role",
            TokenServiceError::InvalidField { .. } => "invalid_field",
            TokenServiceError::Signer(SignerError::InvalidInput(_)) => "signer_rejected",
            TokenServiceError::Signer(SignerError::Internal(_)) => "signer_failed",
            TokenServiceError::UnsupportedMethod => "unsupported_method",
            TokenServiceError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            TokenServiceError::MalformedBody
            | TokenServiceError::WrongFieldType { .. }
            | TokenServiceError::UnknownRole(_)
            | TokenServiceError::InvalidField { .. }
            | TokenServiceError::Signer(SignerError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            TokenServiceError::Signer(SignerError::Internal(_))
            | TokenServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TokenServiceError::UnsupportedMethod => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for TokenServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            TokenServiceError::UnsupportedMethod => {
                return (status, UNSUPPORTED_METHOD_MESSAGE).into_response();
            }
            TokenServiceError::Signer(SignerError::InvalidInput(reason)) => {
                format!("Bad request. {}", reason)
            }
            TokenServiceError::Signer(SignerError::Internal(err)) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "token.signer", error = %err, "Token signing failed");
                "Failed to build token".to_string()
            }
            TokenServiceError::Internal(err) => {
                tracing::error!(target: "token.internal", error = %err, "Internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        token_envelope(message, status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body(body: Body) -> String {
        let bytes = body.collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn read_body_json(body: Body) -> serde_json::Value {
        serde_json::from_str(&read_body(body).await).unwrap()
    }

    #[test]
    fn test_display_wrong_field_type() {
        let error = TokenServiceError::WrongFieldType {
            value: "string".to_string(),
            field: "uid",
            container: "RtcTokenRequest",
            expected: "u32",
        };
        assert_eq!(
            error.to_string(),
            "Bad request. Wrong type provided for field uid of RtcTokenRequest: got string, expected u32"
        );
    }

    #[test]
    fn test_display_unknown_role() {
        assert_eq!(
            TokenServiceError::UnknownRole(7).to_string(),
            "Bad request. Unknown role 7"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TokenServiceError::MalformedBody.status_code(), 400);
        assert_eq!(TokenServiceError::UnknownRole(3).status_code(), 400);
        assert_eq!(
            TokenServiceError::InvalidField {
                field: "ChannelName",
                reason: "must not be empty".to_string()
            }
            .status_code(),
            400
        );
        assert_eq!(
            TokenServiceError::Signer(SignerError::InvalidInput("x".to_string())).status_code(),
            400
        );
        assert_eq!(
            TokenServiceError::Signer(SignerError::Internal("x".to_string())).status_code(),
            500
        );
        assert_eq!(TokenServiceError::UnsupportedMethod.status_code(), 404);
        assert_eq!(
            TokenServiceError::Internal("clock".to_string()).status_code(),
            500
        );
    }

    #[tokio::test]
    async fn test_malformed_body_envelope() {
        let response = TokenServiceError::MalformedBody.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["token"], "Bad request.");
        assert_eq!(body["code"], "400");
    }

    #[tokio::test]
    async fn test_signer_internal_error_hides_detail() {
        let response =
            TokenServiceError::Signer(SignerError::Internal("hmac key rejected".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["token"], "Failed to build token");
        assert_eq!(body["code"], "500");
    }

    #[tokio::test]
    async fn test_signer_invalid_input_is_bad_request() {
        let response = TokenServiceError::Signer(SignerError::InvalidInput(
            "channel name too long".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["token"], "Bad request. channel name too long");
        assert_eq!(body["code"], "400");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_plain_text() {
        let response = TokenServiceError::UnsupportedMethod.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let body = read_body(response.into_body()).await;
        assert_eq!(body, UNSUPPORTED_METHOD_MESSAGE);
    }
}
