//! Token signing seam.
//!
//! Handlers never construct token bytes themselves. They call a
//! [`TokenSigner`] held in application state, which lets tests substitute a
//! recording implementation and keeps the provider's token format in one
//! place ([`access_token`]).

pub mod access_token;

use crate::config::AppCredentials;
use crate::models::{RtcRole, RtmRole};
use thiserror::Error;

pub use access_token::AccessTokenSigner;

/// Failure reported by a signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The signer refused the supplied input (maps to 400).
    #[error("{0}")]
    InvalidInput(String),

    /// The signer failed for reasons unrelated to the request (maps to 500).
    #[error("{0}")]
    Internal(String),
}

/// Builds signed RTC and RTM tokens.
///
/// Implementations must be stateless with respect to individual requests:
/// every argument a token depends on is passed in, never read from shared
/// mutable state.
pub trait TokenSigner: Send + Sync {
    /// Build a token for joining `channel_name` as `uid` with `role`,
    /// valid until `expire_at` (unix seconds).
    fn build_rtc_token(
        &self,
        credentials: &AppCredentials,
        channel_name: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, SignerError>;

    /// Build a messaging token for `user_id`, valid until `expire_at`
    /// (unix seconds).
    fn build_rtm_token(
        &self,
        credentials: &AppCredentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, SignerError>;
}
