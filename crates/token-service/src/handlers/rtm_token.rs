//! RTM token endpoint.

use super::{complete_issuance, read_body};
use crate::errors::TokenServiceError;
use crate::models::RtmTokenRequest;
use crate::observability::hash_for_correlation;
use crate::routes::AppState;
use crate::services::token_service;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Handle an RTM token request.
///
/// POST /fetch_rtm_token
///
/// Body: `{"uid": string}`. Same envelope and status mapping as the RTC
/// endpoint, with a longer default lifetime.
#[instrument(
    name = "token.rtm.issue",
    skip_all,
    fields(token_kind = "rtm", uid, status)
)]
pub async fn handle_rtm_token(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, TokenServiceError> {
    let start = Instant::now();

    let result = read_body(body)
        .and_then(|body| RtmTokenRequest::from_json(&body))
        .and_then(|request| {
            tracing::Span::current().record("uid", hash_for_correlation(&request.user_id).as_str());

            token_service::issue_rtm_token(
                state.signer.as_ref(),
                &state.config.credentials,
                state.config.rtm_token_ttl_seconds,
                &request,
            )
        });

    complete_issuance("rtm", start, result)
}
