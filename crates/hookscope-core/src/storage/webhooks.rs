//! Repository for webhook record database operations.
//!
//! Owns the read-query shape of the capture store, including the keyset
//! pagination used by the listing endpoint.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{RecordPage, WebhookId, WebhookRecord},
};

/// Repository for webhook record database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Inserts a captured record.
    ///
    /// # Errors
    ///
    /// Returns error if the insert fails or constraints are violated.
    pub async fn insert(&self, record: &WebhookRecord) -> Result<WebhookId> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO webhooks (
                id, method, pathname, ip, status_code,
                content_type, content_length, query_params, headers, body,
                created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11
            )
            RETURNING id
            "#,
        )
        .bind(record.id.0)
        .bind(&record.method)
        .bind(&record.pathname)
        .bind(&record.ip)
        .bind(record.status_code)
        .bind(&record.content_type)
        .bind(record.content_length)
        .bind(&record.query_params)
        .bind(&record.headers)
        .bind(&record.body)
        .bind(record.created_at)
        .fetch_one(&*self.pool)
        .await?;

        Ok(WebhookId(id))
    }

    /// Finds a record by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn find_by_id(&self, id: WebhookId) -> Result<Option<WebhookRecord>> {
        let record = sqlx::query_as::<_, WebhookRecord>(
            r#"
            SELECT id, method, pathname, ip, status_code,
                   content_type, content_length, query_params, headers, body,
                   created_at
            FROM webhooks
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    /// Deletes a record by ID.
    ///
    /// Returns `false` when no record matched, so callers can surface
    /// not-found to the client. A second delete of the same id is
    /// therefore not-found by contract.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    pub async fn delete_by_id(&self, id: WebhookId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM webhooks
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns one page of records, newest first.
    ///
    /// Keyset pagination: with a cursor, only records strictly older
    /// (lower id) than the cursor are returned, so pages already issued
    /// stay stable while new captures arrive at the head. The next cursor
    /// is the last returned id whenever a full page came back.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn list_page(&self, cursor: Option<WebhookId>, limit: i64) -> Result<RecordPage> {
        let records = sqlx::query_as::<_, WebhookRecord>(
            r#"
            SELECT id, method, pathname, ip, status_code,
                   content_type, content_length, query_params, headers, body,
                   created_at
            FROM webhooks
            WHERE $1::uuid IS NULL OR id < $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(cursor.map(|c| c.0))
        .bind(limit)
        .fetch_all(&*self.pool)
        .await?;

        let next_cursor = if records.len() == usize::try_from(limit).unwrap_or(usize::MAX) {
            records.last().map(|r| r.id)
        } else {
            None
        };

        Ok(RecordPage { records, next_cursor })
    }

    /// Counts all stored records.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM webhooks")
            .fetch_one(&*self.pool)
            .await?;

        Ok(count.0)
    }
}
