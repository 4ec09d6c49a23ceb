//! Test server harness for E2E testing
//!
//! Provides `TestTokenServer` for spawning real token service instances in
//! tests, backed by a [`RecordingSigner`].

use crate::recording_signer::RecordingSigner;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use token_service::config::Config;
use token_service::routes::{self, AppState};

/// App id used by every test server.
pub const TEST_APP_ID: &str = "970ca35de60c44645bbae8a215061b33";

/// App certificate used by every test server.
pub const TEST_APP_CERTIFICATE: &str = "5cfd2fd1755d40ecb72977518be15d3b";

/// Test harness for spawning the token service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_e2e() -> Result<(), anyhow::Error> {
///     let server = TestTokenServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTokenServer {
    addr: SocketAddr,
    config: Config,
    signer: Arc<RecordingSigner>,
    _handle: JoinHandle<()>,
}

impl TestTokenServer {
    /// Spawn a server with an echoing signer and default configuration.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(RecordingSigner::echoing(), &[]).await
    }

    /// Spawn a server with the given signer and extra environment variables
    /// layered over the test defaults (e.g. `("RTC_TOKEN_TTL_SECONDS", "60")`).
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with(
        signer: RecordingSigner,
        overrides: &[(&str, &str)],
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            ("APP_ID".to_string(), TEST_APP_ID.to_string()),
            (
                "APP_CERTIFICATE".to_string(),
                TEST_APP_CERTIFICATE.to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);
        for (key, value) in overrides {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let signer = Arc::new(signer);
        let state = Arc::new(AppState {
            config: config.clone(),
            signer: signer.clone(),
        });

        // Unregistered recorder: /metrics renders, nothing global is installed
        let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            signer,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The signer behind the server, for inspecting recorded calls.
    pub fn signer(&self) -> &RecordingSigner {
        &self.signer
    }
}

impl Drop for TestTokenServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so each test cleans up immediately
        self._handle.abort();
    }
}
