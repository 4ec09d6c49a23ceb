//! Observability for the token service.
//!
//! Handlers are instrumented with `#[instrument(skip_all)]` and record only
//! safe fields explicitly:
//! - **SAFE**: token kind, role name, outcome, status code
//! - **HASHED**: user ids and channel names (see [`hash_for_correlation`])
//! - **NEVER**: tokens, the app certificate

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Lets related log lines be matched up without writing user ids or channel
/// names in plaintext. Not a secret-protection mechanism.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    hex::encode(result.get(..4).unwrap_or_default())
}
