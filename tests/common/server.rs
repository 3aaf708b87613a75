//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own databases in a temp dir.

use super::constants::*;
use super::fixtures::{seed_analytics, seed_support};
use royalty_dashboard_server::analytics::{AnalyticsStore, SqliteAnalyticsStore};
use royalty_dashboard_server::royalty::{RoyaltyStore, SqliteRoyaltyStore};
use royalty_dashboard_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use royalty_dashboard_server::sqlite_persistence::PoolSettings;
use royalty_dashboard_server::support::{SqliteSupportStore, SupportStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Stores for direct database access in tests
    #[allow(dead_code)]
    pub royalty_store: Arc<dyn RoyaltyStore>,
    #[allow(dead_code)]
    pub analytics_store: Arc<dyn AnalyticsStore>,
    #[allow(dead_code)]
    pub support_store: Arc<dyn SupportStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with seeded analytics and
    /// support data and an empty royalty database.
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding or startup fails.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let settings = PoolSettings {
            read_pool_size: 2,
            ..PoolSettings::default()
        };

        let royalty_store: Arc<dyn RoyaltyStore> = Arc::new(
            SqliteRoyaltyStore::new(temp_db_dir.path().join("royalty.db"), settings)
                .expect("Failed to open royalty store"),
        );
        let analytics_store: Arc<dyn AnalyticsStore> = Arc::new(
            SqliteAnalyticsStore::new(temp_db_dir.path().join("analytics.db"), settings)
                .expect("Failed to open analytics store"),
        );
        let support_store: Arc<dyn SupportStore> = Arc::new(
            SqliteSupportStore::new(temp_db_dir.path().join("support.db"), settings)
                .expect("Failed to open support store"),
        );
        seed_analytics(analytics_store.as_ref()).expect("Failed to seed analytics");
        seed_support(support_store.as_ref()).expect("Failed to seed support");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            max_upload_size_mb: TEST_MAX_UPLOAD_SIZE_MB,
            ..ServerConfig::default()
        };
        let state = ServerState::new(
            config,
            royalty_store.clone(),
            analytics_store.clone(),
            support_store.clone(),
        );
        let app = make_app(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            royalty_store,
            analytics_store,
            support_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling `/`
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
