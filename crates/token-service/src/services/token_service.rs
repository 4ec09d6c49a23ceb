//! Token issuance pipeline.
//!
//! Each call validates one decoded request, maps its role, computes the
//! expiry from the current time and delegates to the signer. Everything a
//! call needs is passed in as arguments; nothing is shared between calls.

use crate::config::AppCredentials;
use crate::errors::TokenServiceError;
use crate::models::{RtcRole, RtcTokenRequest, RtmRole, RtmTokenRequest};
use crate::signer::TokenSigner;

/// Maximum channel name length in bytes.
pub const MAX_CHANNEL_NAME_BYTES: usize = 64;

/// Maximum RTM user id length in bytes.
pub const MAX_USER_ID_BYTES: usize = 64;

/// Punctuation allowed in channel names besides ASCII letters, digits and space.
const CHANNEL_NAME_PUNCTUATION: &str = "!#$%&()+-:;<=.>?@[]^_{|}~,";

/// A signed token together with the expiry it was signed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expire_at: u32,
}

/// Issue an RTC token for a decoded `/fetch_rtc_token` request.
pub fn issue_rtc_token(
    signer: &dyn TokenSigner,
    credentials: &AppCredentials,
    ttl_seconds: u32,
    request: &RtcTokenRequest,
) -> Result<IssuedToken, TokenServiceError> {
    let role = RtcRole::try_from(request.role)?;
    validate_channel_name(&request.channel_name)?;

    let expire_at = expire_at(ttl_seconds)?;
    let token = signer.build_rtc_token(
        credentials,
        &request.channel_name,
        request.uid,
        role,
        expire_at,
    )?;

    ensure_non_empty(token, expire_at)
}

/// Issue an RTM token for a decoded `/fetch_rtm_token` request.
pub fn issue_rtm_token(
    signer: &dyn TokenSigner,
    credentials: &AppCredentials,
    ttl_seconds: u32,
    request: &RtmTokenRequest,
) -> Result<IssuedToken, TokenServiceError> {
    validate_user_id(&request.user_id)?;

    let expire_at = expire_at(ttl_seconds)?;
    let token =
        signer.build_rtm_token(credentials, &request.user_id, RtmRole::RtmUser, expire_at)?;

    ensure_non_empty(token, expire_at)
}

/// Unix time `ttl_seconds` from now.
pub fn expire_at(ttl_seconds: u32) -> Result<u32, TokenServiceError> {
    let now = chrono::Utc::now().timestamp();
    u32::try_from(now)
        .ok()
        .and_then(|now| now.checked_add(ttl_seconds))
        .ok_or_else(|| TokenServiceError::Internal("token expiry out of range".to_string()))
}

pub fn validate_channel_name(channel_name: &str) -> Result<(), TokenServiceError> {
    let invalid = |reason: String| TokenServiceError::InvalidField {
        field: "ChannelName",
        reason,
    };

    if channel_name.is_empty() {
        return Err(invalid("must not be empty".to_string()));
    }

    if channel_name.len() > MAX_CHANNEL_NAME_BYTES {
        return Err(invalid(format!(
            "must be at most {} bytes, got {}",
            MAX_CHANNEL_NAME_BYTES,
            channel_name.len()
        )));
    }

    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || c == ' ' || CHANNEL_NAME_PUNCTUATION.contains(c)
    };
    if !channel_name.chars().all(allowed) {
        return Err(invalid("contains unsupported characters".to_string()));
    }

    Ok(())
}

pub fn validate_user_id(user_id: &str) -> Result<(), TokenServiceError> {
    let invalid = |reason: String| TokenServiceError::InvalidField {
        field: "uid",
        reason,
    };

    if user_id.trim().is_empty() {
        return Err(invalid("must not be empty".to_string()));
    }

    if user_id.len() > MAX_USER_ID_BYTES {
        return Err(invalid(format!(
            "must be at most {} bytes, got {}",
            MAX_USER_ID_BYTES,
            user_id.len()
        )));
    }

    if user_id.chars().any(char::is_control) {
        return Err(invalid("contains control characters".to_string()));
    }

    Ok(())
}

fn ensure_non_empty(token: String, expire_at: u32) -> Result<IssuedToken, TokenServiceError> {
    if token.is_empty() {
        return Err(TokenServiceError::Internal(
            "signer returned an empty token".to_string(),
        ));
    }

    Ok(IssuedToken { token, expire_at })
}
