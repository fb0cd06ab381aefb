//! Test infrastructure for hookscope.
//!
//! Provides isolated per-test databases, fixture builders, and a test
//! environment wiring the production storage layer to a deterministic
//! clock. DB-backed tests require `DATABASE_URL` to point at a PostgreSQL
//! server the test role may create databases on.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use hookscope_api::AppState;
use hookscope_core::{storage::Storage, Clock, TestClock, WebhookId, WebhookRecord};
use sqlx::PgPool;

pub mod database;
pub mod fixtures;

pub use database::TestDatabase;
pub use fixtures::{CaptureBuilder, TestCapture};

/// Test environment with database isolation for integration testing.
///
/// Each environment owns a dedicated database with the schema applied,
/// the production `Storage` layer on top of it, and a controllable clock
/// for capture timestamps.
pub struct TestEnv {
    /// Deterministic clock for time-based testing.
    pub clock: TestClock,
    database: TestDatabase,
    storage: Arc<Storage>,
}

impl TestEnv {
    /// Creates a test environment with an isolated database.
    pub async fn new() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
            )
            .with_test_writer()
            .try_init();

        let database = TestDatabase::new_isolated().await?;
        let storage = Arc::new(Storage::new(database.pool().clone()));

        // TIMESTAMPTZ stores whole microseconds; start the clock on a
        // microsecond boundary so stored timestamps round-trip exactly.
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        let start = std::time::UNIX_EPOCH
            + Duration::from_micros(u64::try_from(since_epoch.as_micros()).unwrap_or(0));
        let clock = TestClock::with_start_time(start);

        Ok(Self { clock, database, storage })
    }

    /// Returns direct access to the database connection pool.
    pub fn pool(&self) -> &PgPool {
        self.database.pool()
    }

    /// Returns access to the storage layer repositories.
    pub fn storage(&self) -> Arc<Storage> {
        self.storage.clone()
    }

    /// Application state wired to this environment, with production-like
    /// defaults (page size 20, 1 MiB capture limit).
    pub fn app_state(&self) -> AppState {
        AppState {
            storage: self.storage.clone(),
            clock: Arc::new(self.clock.clone()) as Arc<dyn Clock>,
            page_size: 20,
            max_capture_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// A ready-to-call router over this environment.
    ///
    /// Peer address information is mocked so the capture handler's
    /// `ConnectInfo` extractor works under `tower::ServiceExt::oneshot`.
    pub fn router(&self) -> axum::Router {
        use axum::extract::connect_info::MockConnectInfo;
        use std::net::SocketAddr;

        let addr: SocketAddr = "192.0.2.1:4242".parse().expect("static test address");
        hookscope_api::create_router(self.app_state()).layer(MockConnectInfo(addr))
    }

    /// Advances the test clock by the specified duration.
    pub fn advance_time(&self, duration: Duration) {
        self.clock.advance(duration);
    }

    /// Returns the clock's current time as a UTC timestamp.
    pub fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.clock.now_system())
    }

    /// Inserts a capture through the production storage layer, assigning
    /// a fresh identifier and the clock's current timestamp.
    pub async fn capture(&self, capture: &TestCapture) -> Result<WebhookId> {
        let record = WebhookRecord::new(
            capture.method.clone(),
            capture.pathname.clone(),
            capture.ip.clone(),
            capture.content_type.clone(),
            capture.body.as_ref().map(|b| b.len() as i64),
            capture.query_params.clone(),
            Some(capture.headers.clone()),
            capture.body.clone(),
            self.now_utc(),
        );

        Ok(self.storage.webhooks.insert(&record).await?)
    }

    /// Shorthand for inserting a JSON capture of the given payload.
    pub async fn capture_json(
        &self,
        pathname: &str,
        value: &serde_json::Value,
    ) -> Result<WebhookId> {
        self.capture(&CaptureBuilder::new().pathname(pathname).json_body(value).build()).await
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<i64> {
        Ok(self.storage.webhooks.count().await?)
    }

    /// Name of this environment's isolated database.
    pub fn database_name(&self) -> &str {
        self.database.database_name()
    }
}
