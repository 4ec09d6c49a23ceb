//! Liveness probe.

/// Handler for GET /health
///
/// The service holds no external dependencies, so being able to answer is
/// the whole health check.
pub async fn health_check() -> &'static str {
    "OK"
}
