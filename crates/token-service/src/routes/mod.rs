//! HTTP routes for the token service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::signer::TokenSigner;
use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
///
/// Read-only after startup. Per-request values never live here.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration, including the signing credentials.
    pub config: Config,

    /// Signer used by both token endpoints.
    pub signer: Arc<dyn TokenSigner>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/fetch_rtc_token` - RTC token (POST), preflight (OPTIONS), 404 otherwise
/// - `/fetch_rtm_token` - RTM token (POST), preflight (OPTIONS), 404 otherwise
/// - `/health` - Liveness probe (plain "OK")
/// - `/metrics` - Prometheus metrics endpoint
/// - CORS headers on every response
/// - TraceLayer for request logging
/// - Request timeout from configuration
/// - HTTP metrics middleware (outermost)
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let token_routes = Router::new()
        .route(
            "/fetch_rtc_token",
            post(handlers::handle_rtc_token)
                .options(handlers::preflight)
                .fallback(handlers::unsupported_method),
        )
        .route(
            "/fetch_rtm_token",
            post(handlers::handle_rtm_token)
                .options(handlers::preflight)
                .fallback(handlers::unsupported_method),
        )
        .route("/health", get(handlers::health_check))
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CORS headers - Applied to every response, errors included
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    token_routes
        .merge(metrics_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ))
        .layer(middleware::from_fn(http_metrics_middleware))
}
