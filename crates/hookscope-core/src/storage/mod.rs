//! Database access layer implementing the repository pattern for captured
//! webhook records.
//!
//! All database operations go through these repositories. Direct SQL
//! outside this module is forbidden to keep the schema isolated from the
//! HTTP surface.

use std::sync::Arc;

use sqlx::PgPool;

pub mod webhooks;

use crate::error::Result;

/// Container for repository instances providing unified database access.
#[derive(Clone)]
pub struct Storage {
    /// Repository for webhook record operations.
    pub webhooks: Arc<webhooks::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        let pool = Arc::new(pool);

        Self { webhooks: Arc::new(webhooks::Repository::new(pool)) }
    }

    /// Performs a health check on the database connection.
    ///
    /// Executes a lightweight query to verify connectivity. Used by the
    /// readiness probe.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.webhooks.pool()).await?;

        Ok(())
    }
}

/// Creates the schema if it does not exist yet.
///
/// Idempotent; run at service startup and by the test harness when
/// provisioning isolated databases.
///
/// # Errors
///
/// Returns an error if the DDL statement fails.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS webhooks (
            id UUID PRIMARY KEY,
            method TEXT NOT NULL,
            pathname TEXT NOT NULL,
            ip TEXT NOT NULL,
            status_code INTEGER NOT NULL DEFAULT 200,
            content_type TEXT,
            content_length BIGINT,
            query_params JSONB,
            headers JSONB,
            body TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_can_be_created() {
        // Instantiation only; database behavior is covered by integration
        // tests.
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let _storage = Storage::new(pool);
    }
}
