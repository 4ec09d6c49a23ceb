//! A [`TokenSigner`] that records its calls.
//!
//! In the default echo mode the returned token spells out every argument the
//! signer received, so a test can check that a response was built from its
//! own request and nobody else's.

use std::sync::Mutex;
use token_service::config::AppCredentials;
use token_service::models::{RtcRole, RtmRole};
use token_service::signer::{SignerError, TokenSigner};

/// One recorded signer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerCall {
    Rtc {
        app_id: String,
        channel_name: String,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    },
    Rtm {
        app_id: String,
        user_id: String,
        role: RtmRole,
        expire_at: u32,
    },
}

enum Mode {
    Echo,
    Fail(SignerError),
    Empty,
}

/// Signer double for handler and E2E tests.
pub struct RecordingSigner {
    mode: Mode,
    calls: Mutex<Vec<SignerCall>>,
}

impl RecordingSigner {
    /// Succeeds with a token of the form
    /// `rtc:<channel>:<uid>:<role code>:<expire_at>` or
    /// `rtm:<user_id>:<role code>:<expire_at>`.
    pub fn echoing() -> Self {
        Self::with_mode(Mode::Echo)
    }

    /// Fails every call with `error`.
    pub fn failing(error: SignerError) -> Self {
        Self::with_mode(Mode::Fail(error))
    }

    /// Succeeds with an empty token, which the service must not pass on.
    pub fn returning_empty() -> Self {
        Self::with_mode(Mode::Empty)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all calls so far, in order.
    pub fn calls(&self) -> Vec<SignerCall> {
        self.calls.lock().expect("signer call log poisoned").clone()
    }

    fn record(&self, call: SignerCall) {
        self.calls
            .lock()
            .expect("signer call log poisoned")
            .push(call);
    }

    fn respond(&self, echo: String) -> Result<String, SignerError> {
        match &self.mode {
            Mode::Echo => Ok(echo),
            Mode::Fail(error) => Err(error.clone()),
            Mode::Empty => Ok(String::new()),
        }
    }
}

impl TokenSigner for RecordingSigner {
    fn build_rtc_token(
        &self,
        credentials: &AppCredentials,
        channel_name: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, SignerError> {
        self.record(SignerCall::Rtc {
            app_id: credentials.app_id.clone(),
            channel_name: channel_name.to_string(),
            uid,
            role,
            expire_at,
        });
        self.respond(format!(
            "rtc:{}:{}:{}:{}",
            channel_name,
            uid,
            role.code(),
            expire_at
        ))
    }

    fn build_rtm_token(
        &self,
        credentials: &AppCredentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, SignerError> {
        self.record(SignerCall::Rtm {
            app_id: credentials.app_id.clone(),
            user_id: user_id.to_string(),
            role,
            expire_at,
        });
        self.respond(format!("rtm:{}:{}:{}", user_id, role.code(), expire_at))
    }
}
