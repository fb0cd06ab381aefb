//! Database management for deterministic testing.
//!
//! Provisions one isolated PostgreSQL database per test environment so
//! tests never observe each other's records. Requires `DATABASE_URL` to
//! point at a server the test role may create databases on.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::{debug, info};
use uuid::Uuid;

// Singleton admin pool for database management operations.
static ADMIN_POOL: tokio::sync::OnceCell<PgPool> = tokio::sync::OnceCell::const_new();

/// Handle to an isolated test database.
#[derive(Debug)]
pub struct TestDatabase {
    pool: PgPool,
    database_name: String,
}

impl TestDatabase {
    /// Creates a new isolated test database with the schema applied.
    pub async fn new_isolated() -> Result<Self> {
        let admin_pool = create_admin_pool().await?;

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let database_name = format!("hookscope_test_{}_{}", timestamp, Uuid::new_v4().simple());

        sqlx::query(&format!("CREATE DATABASE \"{database_name}\""))
            .execute(&admin_pool)
            .await
            .with_context(|| format!("failed to create database {database_name}"))?;

        let pool = create_database_pool(&database_name).await?;

        hookscope_core::storage::run_migrations(&pool)
            .await
            .context("failed to apply schema to test database")?;

        info!("created isolated test database: {}", database_name);

        Ok(Self { pool, database_name })
    }

    /// Access to the database pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the database name.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Drops this test database, terminating its remaining connections.
    pub async fn drop_database(self) -> Result<()> {
        let database_name = self.database_name;
        self.pool.close().await;

        let admin_pool = create_admin_pool().await?;

        let _ = sqlx::query(&format!(
            "SELECT pg_terminate_backend(pid)
             FROM pg_stat_activity
             WHERE datname = '{database_name}'
             AND pid <> pg_backend_pid()"
        ))
        .execute(&admin_pool)
        .await;

        sqlx::query(&format!("DROP DATABASE IF EXISTS \"{database_name}\""))
            .execute(&admin_pool)
            .await
            .with_context(|| format!("failed to drop database: {database_name}"))?;

        Ok(())
    }
}

/// Create or reuse the admin connection pool for database management.
pub async fn create_admin_pool() -> Result<PgPool> {
    // Check if pool exists and is healthy
    if let Some(pool) = ADMIN_POOL.get() {
        if !pool.is_closed() {
            return Ok(pool.clone());
        }
    }

    let pool = ADMIN_POOL
        .get_or_try_init(|| async {
            let database_url = std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable is required")?;

            let opts = database_url
                .parse::<PgConnectOptions>()
                .context("failed to parse DATABASE_URL")?
                .database("postgres");

            let pool = PgPoolOptions::new()
                .max_connections(2)
                .min_connections(0)
                .max_lifetime(Duration::from_secs(300))
                .acquire_timeout(Duration::from_secs(3))
                .connect_with(opts)
                .await
                .context("failed to connect to admin database")?;

            anyhow::Ok(pool)
        })
        .await?;

    debug!("admin connection pool ready");

    Ok(pool.clone())
}

/// Create a connection pool for a specific database.
pub async fn create_database_pool(database_name: &str) -> Result<PgPool> {
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

    let opts = database_url
        .parse::<PgConnectOptions>()
        .context("failed to parse DATABASE_URL")?
        .database(database_name);

    let pool = PgPoolOptions::new()
        .max_connections(4)
        .min_connections(0)
        .max_lifetime(Duration::from_secs(300))
        .idle_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(opts)
        .await
        .with_context(|| {
            format!("failed to create connection pool for database: {database_name}")
        })?;

    debug!("created database pool for {}", database_name);

    Ok(pool)
}
