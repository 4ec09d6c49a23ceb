//! RTC/RTM Token Service Library
//!
//! Issues short-lived tokens for joining real-time audio/video (RTC)
//! channels and messaging (RTM) sessions. Each request is decoded,
//! validated, mapped to a signing role and expiry, and handed to a
//! [`signer::TokenSigner`]; the result is returned in a uniform
//! `{token, code}` JSON envelope.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/token_service.rs -> signer/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `models` - Request/response models and role mapping
//! - `observability` - Correlation hashing and metrics
//! - `response` - The `{token, code}` envelope encoder
//! - `routes` - Axum router setup
//! - `services` - Token issuance pipeline
//! - `signer` - Signer seam and the default access token signer

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod response;
pub mod routes;
pub mod services;
pub mod signer;
