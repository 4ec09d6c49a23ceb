//! RTC token endpoint.

use super::{complete_issuance, read_body};
use crate::errors::TokenServiceError;
use crate::models::{RtcRole, RtcTokenRequest};
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

/// Handle an RTC token request.
///
/// POST /fetch_rtc_token
///
/// Body: `{"uid": u32, "ChannelName": string, "role": u32}`. The body is
/// decoded whatever the `Content-Type`; a body that cannot be read, including
/// one over the size limit, is a 400. Responds with `{"token", "code"}`:
/// 200 with the signed token, 400 for malformed bodies, unknown roles or
/// invalid channel names, 500 when signing fails.
///
/// Channel and uid are only recorded as correlation hashes.
#[instrument(
    name = "token.rtc.issue",
    skip_all,
    fields(token_kind = "rtc", role, channel, uid, status)
)]
pub async fn handle_rtc_token(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, TokenServiceError> {
    let start = Instant::now();

    let result = read_body(body)
        .and_then(|body| RtcTokenRequest::from_json(&body))
        .and_then(|request| {
            let span = tracing::Span::current();
            span.record("channel", hash_for_correlation(&request.channel_name).as_str());
            span.record("uid", hash_for_correlation(&request.uid.to_string()).as_str());
            if let Ok(role) = RtcRole::try_from(request.role) {
                span.record("role", role.as_str());
            }

            token_service::issue_rtc_token(
                state.signer.as_ref(),
                &state.config.credentials,
                state.config.rtc_token_ttl_seconds,
                &request,
            )
        });

    complete_issuance("rtc", start, result)
}
