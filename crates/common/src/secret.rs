//! Secret types for protecting sensitive values from accidental logging.
//!
//! Re-exports the [`secrecy`] types used for the app certificate and any
//! other signing material. `SecretString` implements `Debug` with redaction,
//! so a struct that derives `Debug` while holding one stays safe to log.
//! The inner value is zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct AppCredentials {
//!     app_id: String,
//!     app_certificate: SecretString,
//! }
//!
//! let creds = AppCredentials {
//!     app_id: "970ca35de60c44645bbae8a215061b33".to_string(),
//!     app_certificate: SecretString::from("5cfd2fd1755d40ecb72977518be15d3b"),
//! };
//!
//! // The certificate is redacted in Debug output
//! assert!(!format!("{creds:?}").contains("5cfd2fd1"));
//!
//! // Reading it back is explicit
//! let cert: &str = creds.app_certificate.expose_secret();
//! assert_eq!(cert.len(), 32);
//! ```

pub use secrecy::{ExposeSecret, SecretString};
