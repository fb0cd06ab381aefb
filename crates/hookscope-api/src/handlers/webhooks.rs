//! Listing, detail, and delete handlers for captured records.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookscope_core::{WebhookId, WebhookRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, server::AppState};

/// Query parameters for the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Identifier of the last record from the previous page.
    pub cursor: Option<String>,
}

/// One page of records plus the cursor for the next page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    /// Records in reverse-chronological order.
    pub webhooks: Vec<WebhookRecord>,
    /// Cursor for the next page; absent at the end of data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<WebhookId>,
}

/// Lists captured records, newest first, with keyset pagination.
///
/// # Errors
///
/// - 400 when the cursor is not a well-formed identifier
/// - 500 on storage failure
#[instrument(name = "list_webhooks", skip(state))]
pub async fn list_webhooks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let cursor = match query.cursor {
        Some(raw) => Some(
            raw.parse::<WebhookId>()
                .map_err(|_| ApiError::InvalidCursor { cursor: raw })?,
        ),
        None => None,
    };

    let page = state.storage.webhooks.list_page(cursor, state.page_size).await?;

    Ok(Json(ListResponse { webhooks: page.records, next_cursor: page.next_cursor }))
}

/// Fetches one record by identifier.
///
/// # Errors
///
/// - 400 when the identifier is malformed
/// - 404 when no record matches
#[instrument(name = "get_webhook", skip(state))]
pub async fn get_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WebhookRecord>, ApiError> {
    let id = parse_id(&id)?;

    match state.storage.webhooks.find_by_id(id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound { id }),
    }
}

/// Deletes one record by identifier.
///
/// Not idempotent by contract: a second delete of the same id returns
/// 404, which retrying callers treat as already-deleted.
///
/// # Errors
///
/// - 400 when the identifier is malformed
/// - 404 when no record matches
#[instrument(name = "delete_webhook", skip(state))]
pub async fn delete_webhook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    if state.storage.webhooks.delete_by_id(id).await? {
        info!(webhook_id = %id, "deleted captured record");
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound { id })
    }
}

fn parse_id(raw: &str) -> Result<WebhookId, ApiError> {
    raw.parse::<WebhookId>().map_err(|_| ApiError::InvalidId { id: raw.to_string() })
}
