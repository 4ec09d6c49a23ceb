//! Method handling shared by both token endpoints.

use crate::errors::TokenServiceError;
use axum::http::StatusCode;

/// `OPTIONS` on a token endpoint: 200 with an empty body.
///
/// The CORS headers themselves come from the router's header layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST or OPTIONS on a token endpoint.
pub async fn unsupported_method() -> TokenServiceError {
    TokenServiceError::UnsupportedMethod
}
