//! # Token Service Test Utilities
//!
//! Shared test utilities for the token service.
//!
//! This crate provides:
//! - Server test harness (`TestTokenServer` for E2E tests)
//! - A recording signer (`RecordingSigner`) that captures every call and can
//!   be switched into failure modes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use token_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestTokenServer::spawn().await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .post(format!("{}/fetch_rtm_token", server.url()))
//!         .body(r#"{"uid":"user42"}"#)
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     assert_eq!(server.signer().calls().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod recording_signer;
pub mod server_harness;

// Re-export commonly used items
pub use recording_signer::*;
pub use server_harness::*;
