//! Domain model for captured webhook requests.
//!
//! Defines the webhook record entity and its time-ordered identifier.
//! Records are immutable after capture; the only mutation the system
//! performs is deletion.

use std::{collections::HashMap, fmt, str::FromStr, sync::Mutex};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::{
    timestamp::{context::ContextV7, Timestamp},
    Uuid,
};

use crate::payload::Payload;

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Shared v7 context so identifiers generated within the same millisecond
/// still sort in generation order.
static ID_CONTEXT: Lazy<Mutex<ContextV7>> = Lazy::new(|| Mutex::new(ContextV7::new()));

/// Strongly-typed webhook record identifier.
///
/// Wraps a UUIDv7, so byte order equals creation order. This makes the
/// identifier usable directly as a keyset-pagination cursor: `id < cursor`
/// selects exactly the records captured before the cursor's record.
///
/// # Example
///
/// ```
/// use hookscope_core::models::WebhookId;
/// let first = WebhookId::generate();
/// let second = WebhookId::generate();
/// assert!(first < second);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WebhookId(pub Uuid);

impl WebhookId {
    /// Generates a new time-ordered identifier.
    ///
    /// Identifiers are strictly monotonic across a process, including
    /// multiple generations within one millisecond.
    pub fn generate() -> Self {
        Self(Uuid::new_v7(Timestamp::now(&*ID_CONTEXT)))
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WebhookId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for WebhookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl sqlx::Type<PgDb> for WebhookId {
    fn type_info() -> PgTypeInfo {
        <Uuid as sqlx::Type<PgDb>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for WebhookId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <Uuid as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(uuid))
    }
}

impl sqlx::Encode<'_, PgDb> for WebhookId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <Uuid as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// One captured inbound HTTP request, stored verbatim with metadata.
///
/// Created exclusively by the capture endpoint; immutable afterwards
/// except for deletion. Serializes in camelCase to match the wire format
/// the list UI consumes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRecord {
    /// Unique, time-ordered identifier. Assigned at capture, never changes.
    pub id: WebhookId,

    /// HTTP method of the captured request.
    pub method: String,

    /// Request path below the capture prefix, always `/`-prefixed.
    pub pathname: String,

    /// Source address of the caller.
    pub ip: String,

    /// Status code returned to the capture caller. Always 200 today.
    pub status_code: i32,

    /// Content-Type header, when the request carried one.
    pub content_type: Option<String>,

    /// Content-Length header, when the request carried one.
    pub content_length: Option<i64>,

    /// Query string parameters, absent when the URL had no query.
    pub query_params: Option<sqlx::types::Json<HashMap<String, String>>>,

    /// Full request header mapping.
    pub headers: Option<sqlx::types::Json<HashMap<String, String>>>,

    /// Raw body text. Absent for bodyless requests.
    pub body: Option<String>,

    /// Server-assigned capture timestamp, monotonic with `id`.
    pub created_at: DateTime<Utc>,
}

impl WebhookRecord {
    /// Creates a record from the parts of a live request.
    ///
    /// Assigns a fresh identifier; `created_at` is supplied by the caller
    /// so the capture handler can source it from its clock.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        method: String,
        pathname: String,
        ip: String,
        content_type: Option<String>,
        content_length: Option<i64>,
        query_params: Option<HashMap<String, String>>,
        headers: Option<HashMap<String, String>>,
        body: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: WebhookId::generate(),
            method,
            pathname,
            ip,
            status_code: 200,
            content_type,
            content_length,
            query_params: query_params.map(sqlx::types::Json),
            headers: headers.map(sqlx::types::Json),
            body,
            created_at,
        }
    }

    /// Classifies this record's body for handler-code generation.
    pub fn payload(&self) -> Payload {
        Payload::classify(self.content_type.as_deref(), self.body.as_deref())
    }
}

/// One page of records from a keyset-paginated listing.
#[derive(Debug, Clone)]
pub struct RecordPage {
    /// Records in descending identifier order, newest first.
    pub records: Vec<WebhookRecord>,
    /// Cursor for the next page. Absent when this page ended the data.
    pub next_cursor: Option<WebhookId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_roundtrips_through_display_and_parse() {
        let id = WebhookId::generate();
        let parsed: WebhookId = id.to_string().parse().expect("parse own display output");
        assert_eq!(id, parsed);
    }

    #[test]
    fn identifier_rejects_malformed_input() {
        assert!("not-a-uuid".parse::<WebhookId>().is_err());
        assert!("".parse::<WebhookId>().is_err());
    }

    #[test]
    fn generated_identifiers_are_strictly_increasing() {
        let ids: Vec<WebhookId> = (0..100).map(|_| WebhookId::generate()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn record_serializes_in_camel_case() {
        let record = WebhookRecord::new(
            "POST".to_string(),
            "/orders".to_string(),
            "203.0.113.10".to_string(),
            Some("application/json".to_string()),
            Some(7),
            None,
            None,
            Some(r#"{"a":1}"#.to_string()),
            Utc::now(),
        );

        let json = serde_json::to_value(&record).expect("serialize record");
        assert!(json.get("statusCode").is_some());
        assert!(json.get("contentType").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("status_code").is_none());
    }

    #[test]
    fn new_record_defaults_status_to_200() {
        let record = WebhookRecord::new(
            "GET".to_string(),
            "/".to_string(),
            "127.0.0.1".to_string(),
            None,
            None,
            None,
            None,
            None,
            Utc::now(),
        );
        assert_eq!(record.status_code, 200);
    }
}
