//! Capture handler: normalizes any inbound request into a stored record.
//!
//! Accepts every method and path below the capture prefix. The caller
//! always gets 200 after a successful insert regardless of what was sent;
//! the only rejections are oversized payloads and storage failures.

use std::{collections::HashMap, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hookscope_core::{WebhookId, WebhookRecord};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::{error::ApiError, server::AppState};

const CAPTURE_PREFIX: &str = "/capture";

/// Response from a successful capture.
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    /// Identifier of the stored record.
    pub id: WebhookId,
}

/// Captures an inbound webhook request.
///
/// Builds a record from the live request: method, path below the capture
/// prefix, source IP, content-type/length headers, full header mapping,
/// query-parameter mapping, and body text.
///
/// # Errors
///
/// - 413 when the body exceeds the configured capture limit
/// - 500 when the store write fails; the request is not retried
#[instrument(
    name = "capture_webhook",
    skip(state, headers, body),
    fields(method = %method, path = %uri.path(), payload_size = body.len())
)]
pub async fn capture_webhook(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if body.len() > state.max_capture_bytes {
        warn!(limit = state.max_capture_bytes, "capture payload exceeds size limit");
        return ApiError::PayloadTooLarge { size_bytes: body.len() }.into_response();
    }

    let record = build_record(&state, addr, &method, &uri, &headers, &body);
    let id = record.id;

    match state.storage.webhooks.insert(&record).await {
        Ok(_) => {
            info!(webhook_id = %id, "captured webhook request");
            (StatusCode::OK, Json(CaptureResponse { id })).into_response()
        },
        Err(e) => {
            error!(error = %e, "failed to persist captured request");
            ApiError::from(e).into_response()
        },
    }
}

/// Normalizes the live request into a record.
fn build_record(
    state: &AppState,
    addr: SocketAddr,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> WebhookRecord {
    let pathname = capture_pathname(uri);
    let ip = source_ip(headers, addr);

    let content_type =
        headers.get("content-type").and_then(|v| v.to_str().ok()).map(str::to_string);
    let content_length = headers
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());

    let query_params = query_params(uri);
    let header_map = extract_headers(headers);
    let body_text = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    };

    let created_at = DateTime::<Utc>::from(state.clock.now_system());

    WebhookRecord::new(
        method.to_string(),
        pathname,
        ip,
        content_type,
        content_length,
        query_params,
        Some(header_map),
        body_text,
        created_at,
    )
}

/// Path below the capture prefix, always `/`-prefixed.
fn capture_pathname(uri: &Uri) -> String {
    let rest = uri.path().strip_prefix(CAPTURE_PREFIX).unwrap_or(uri.path());
    if rest.is_empty() {
        "/".to_string()
    } else {
        rest.to_string()
    }
}

/// Source address: first X-Forwarded-For entry when present, otherwise
/// the peer socket address.
fn source_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// Query string parameters, absent when the URL had no query.
fn query_params(uri: &Uri) -> Option<HashMap<String, String>> {
    let query = uri.query()?;
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if params.is_empty() {
        None
    } else {
        Some(params)
    }
}

/// Extracts headers into a map for storage.
fn extract_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (name, value) in headers {
        if let Ok(value_str) = value.to_str() {
            map.insert(name.as_str().to_string(), value_str.to_string());
        }
    }
    map
}
