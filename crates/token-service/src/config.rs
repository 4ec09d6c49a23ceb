//! Token service configuration.
//!
//! Configuration is loaded once at startup from environment variables. The
//! app certificate is held as a [`SecretString`] and redacted in Debug output.

use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default listen port when neither `PORT` nor `BIND_ADDRESS` is set.
pub const DEFAULT_PORT: u16 = 8082;

/// Default RTC token lifetime (40 * 20 seconds).
pub const DEFAULT_RTC_TOKEN_TTL_SECONDS: u32 = 40 * 20;

/// Default RTM token lifetime (3600 * 20 seconds).
pub const DEFAULT_RTM_TOKEN_TTL_SECONDS: u32 = 3600 * 20;

/// Upper bound for either token lifetime (24 hours).
pub const MAX_TOKEN_TTL_SECONDS: u32 = 86_400;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Length of a provider app id / app certificate in hex characters.
const CREDENTIAL_HEX_LEN: usize = 32;

/// App id and signing certificate issued by the token provider.
#[derive(Clone)]
pub struct AppCredentials {
    /// Public tenant identifier, embedded in every token.
    pub app_id: String,

    /// Signing secret. Never logged.
    pub app_certificate: SecretString,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .finish()
    }
}

/// Token service configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8082").
    pub bind_address: String,

    /// Credentials handed to the signer for every token.
    pub credentials: AppCredentials,

    /// Lifetime of RTC tokens in seconds.
    pub rtc_token_ttl_seconds: u32,

    /// Lifetime of RTM tokens in seconds.
    pub rtm_token_ttl_seconds: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// How long to keep draining connections after a shutdown signal.
    pub drain_seconds: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid token TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid drain period: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let app_id = required_credential(vars, "APP_ID")?;
        let app_certificate = required_credential(vars, "APP_CERTIFICATE")?;

        let bind_address = match vars.get("BIND_ADDRESS") {
            Some(address) => address.clone(),
            None => {
                let port = match vars.get("PORT") {
                    Some(value) => value.parse::<u16>().map_err(|e| {
                        ConfigError::InvalidPort(format!(
                            "PORT must be a valid port number, got '{}': {}",
                            value, e
                        ))
                    })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let rtc_token_ttl_seconds =
            parse_ttl(vars, "RTC_TOKEN_TTL_SECONDS", DEFAULT_RTC_TOKEN_TTL_SECONDS)?;
        let rtm_token_ttl_seconds =
            parse_ttl(vars, "RTM_TOKEN_TTL_SECONDS", DEFAULT_RTM_TOKEN_TTL_SECONDS)?;

        let request_timeout_seconds = if let Some(value_str) = vars.get("REQUEST_TIMEOUT_SECONDS")
        {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "REQUEST_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        };

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value_str) => value_str.parse().map_err(|e| {
                ConfigError::InvalidDrain(format!(
                    "DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?,
            None => 0,
        };

        Ok(Config {
            bind_address,
            credentials: AppCredentials {
                app_id: app_id.expose_secret().to_string(),
                app_certificate,
            },
            rtc_token_ttl_seconds,
            rtm_token_ttl_seconds,
            request_timeout_seconds,
            drain_seconds,
        })
    }
}

/// Read a provider credential and check it is 32 hex characters.
///
/// Returned as a secret so the raw value never reaches an error message.
fn required_credential(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<SecretString, ConfigError> {
    let value = vars
        .get(name)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;

    if value.len() != CREDENTIAL_HEX_LEN {
        return Err(ConfigError::InvalidCredential(format!(
            "{} must be {} hex characters, got {}",
            name,
            CREDENTIAL_HEX_LEN,
            value.len()
        )));
    }

    if hex::decode(value).is_err() {
        return Err(ConfigError::InvalidCredential(format!(
            "{} must contain only hex characters",
            name
        )));
    }

    Ok(SecretString::from(value.clone()))
}

fn parse_ttl(
    vars: &HashMap<String, String>,
    name: &str,
    default: u32,
) -> Result<u32, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: u32 = value_str.parse().map_err(|e| {
        ConfigError::InvalidTtl(format!(
            "{} must be a valid positive integer, got '{}': {}",
            name, value_str, e
        ))
    })?;

    if value == 0 || value > MAX_TOKEN_TTL_SECONDS {
        return Err(ConfigError::InvalidTtl(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_TOKEN_TTL_SECONDS, value
        )));
    }

    Ok(value)
}
