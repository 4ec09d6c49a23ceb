//! Version 006 dynamic-key access tokens.
//!
//! Layout of a token:
//!
//! ```text
//! "006" || app_id || base64(content)
//!
//! content = bytes(signature) || u32(crc32(channel)) || u32(crc32(uid)) || bytes(message)
//! message = u32(salt) || u32(ts) || map<u16, u32>(privileges)
//! signature = HMAC-SHA256(app_certificate, app_id || channel || uid || message)
//! ```
//!
//! Integers are little-endian. `bytes(x)` is a u16 length followed by the
//! raw bytes; a map is a u16 entry count followed by key/value pairs in
//! ascending key order. `ts` bounds the lifetime of the signed message
//! itself, independently of each privilege's own expiry.

use super::{SignerError, TokenSigner};
use crate::config::AppCredentials;
use crate::models::{RtcRole, RtmRole};
use base64::{engine::general_purpose, Engine as _};
use common::secret::ExposeSecret;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use std::collections::BTreeMap;
use tracing::instrument;

/// Token format version prefix.
pub const VERSION: &str = "006";

/// Lifetime of the signed message (24 hours).
const MESSAGE_TTL_SECONDS: u32 = 24 * 3600;

/// Salts are drawn from `1..=MAX_SALT`.
const MAX_SALT: u32 = 99_999_999;

/// Privilege keys understood by the media and messaging edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    JoinChannel,
    PublishAudioStream,
    PublishVideoStream,
    PublishDataStream,
    RtmLogin,
}

impl Privilege {
    pub fn key(self) -> u16 {
        match self {
            Privilege::JoinChannel => 1,
            Privilege::PublishAudioStream => 2,
            Privilege::PublishVideoStream => 3,
            Privilege::PublishDataStream => 4,
            Privilege::RtmLogin => 1000,
        }
    }
}

/// A token under construction.
pub struct AccessToken<'a> {
    app_id: &'a str,
    app_certificate: &'a str,
    channel_name: &'a str,
    uid: String,
    salt: u32,
    ts: u32,
    privileges: BTreeMap<u16, u32>,
}

impl<'a> AccessToken<'a> {
    pub fn new(
        app_id: &'a str,
        app_certificate: &'a str,
        channel_name: &'a str,
        uid: String,
        salt: u32,
        ts: u32,
    ) -> Self {
        Self {
            app_id,
            app_certificate,
            channel_name,
            uid,
            salt,
            ts,
            privileges: BTreeMap::new(),
        }
    }

    pub fn add_privilege(&mut self, privilege: Privilege, expire_at: u32) {
        self.privileges.insert(privilege.key(), expire_at);
    }

    /// Sign and encode the token.
    pub fn build(&self) -> Result<String, SignerError> {
        let message = self.pack_message()?;

        let mut signed = Vec::with_capacity(
            self.app_id.len() + self.channel_name.len() + self.uid.len() + message.len(),
        );
        signed.extend_from_slice(self.app_id.as_bytes());
        signed.extend_from_slice(self.channel_name.as_bytes());
        signed.extend_from_slice(self.uid.as_bytes());
        signed.extend_from_slice(&message);

        let key = hmac::Key::new(hmac::HMAC_SHA256, self.app_certificate.as_bytes());
        let signature = hmac::sign(&key, &signed);

        let mut content = Vec::new();
        pack_bytes(&mut content, signature.as_ref())?;
        pack_u32(&mut content, crc32fast::hash(self.channel_name.as_bytes()));
        pack_u32(&mut content, crc32fast::hash(self.uid.as_bytes()));
        pack_bytes(&mut content, &message)?;

        Ok(format!(
            "{}{}{}",
            VERSION,
            self.app_id,
            general_purpose::STANDARD.encode(content)
        ))
    }

    fn pack_message(&self) -> Result<Vec<u8>, SignerError> {
        let mut message = Vec::new();
        pack_u32(&mut message, self.salt);
        pack_u32(&mut message, self.ts);

        let count = u16::try_from(self.privileges.len())
            .map_err(|_| SignerError::Internal("too many privileges".to_string()))?;
        pack_u16(&mut message, count);
        for (key, expire_at) in &self.privileges {
            pack_u16(&mut message, *key);
            pack_u32(&mut message, *expire_at);
        }

        Ok(message)
    }
}

fn pack_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn pack_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn pack_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), SignerError> {
    let len = u16::try_from(bytes.len())
        .map_err(|_| SignerError::Internal(format!("field of {} bytes too long", bytes.len())))?;
    pack_u16(buf, len);
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Default [`TokenSigner`]: builds version 006 access tokens locally.
pub struct AccessTokenSigner {
    rng: SystemRandom,
}

impl AccessTokenSigner {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    fn salt(&self) -> Result<u32, SignerError> {
        let mut bytes = [0u8; 4];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| SignerError::Internal("failed to generate salt".to_string()))?;
        Ok(u32::from_le_bytes(bytes) % MAX_SALT + 1)
    }

    fn message_ts() -> Result<u32, SignerError> {
        let now = chrono::Utc::now().timestamp();
        u32::try_from(now)
            .ok()
            .and_then(|now| now.checked_add(MESSAGE_TTL_SECONDS))
            .ok_or_else(|| SignerError::Internal("system clock out of range".to_string()))
    }

    fn check_credentials(credentials: &AppCredentials) -> Result<(), SignerError> {
        if credentials.app_id.is_empty() || credentials.app_certificate.expose_secret().is_empty()
        {
            return Err(SignerError::Internal(
                "app credentials are not configured".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AccessTokenSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSigner for AccessTokenSigner {
    #[instrument(skip_all, name = "token.signer.rtc", fields(role = role.as_str()))]
    fn build_rtc_token(
        &self,
        credentials: &AppCredentials,
        channel_name: &str,
        uid: u32,
        role: RtcRole,
        expire_at: u32,
    ) -> Result<String, SignerError> {
        Self::check_credentials(credentials)?;

        // uid 0 signs for any user and is encoded as an empty string
        let uid = if uid == 0 {
            String::new()
        } else {
            uid.to_string()
        };

        let mut token = AccessToken::new(
            &credentials.app_id,
            credentials.app_certificate.expose_secret(),
            channel_name,
            uid,
            self.salt()?,
            Self::message_ts()?,
        );

        token.add_privilege(Privilege::JoinChannel, expire_at);
        if role.can_publish() {
            token.add_privilege(Privilege::PublishAudioStream, expire_at);
            token.add_privilege(Privilege::PublishVideoStream, expire_at);
            token.add_privilege(Privilege::PublishDataStream, expire_at);
        }

        token.build()
    }

    #[instrument(skip_all, name = "token.signer.rtm")]
    fn build_rtm_token(
        &self,
        credentials: &AppCredentials,
        user_id: &str,
        role: RtmRole,
        expire_at: u32,
    ) -> Result<String, SignerError> {
        Self::check_credentials(credentials)?;

        match role {
            RtmRole::RtmUser => {
                // Messaging tokens sign the user account in the channel slot
                let mut token = AccessToken::new(
                    &credentials.app_id,
                    credentials.app_certificate.expose_secret(),
                    user_id,
                    String::new(),
                    self.salt()?,
                    Self::message_ts()?,
                );
                token.add_privilege(Privilege::RtmLogin, expire_at);
                token.build()
            }
        }
    }
}
