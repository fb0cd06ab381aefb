//! Integration tests for the webhook record repository.
//!
//! Exercises the storage contract directly: insert/read equality, delete
//! semantics, and the keyset pagination guarantees.

use hookscope_core::{WebhookId, WebhookRecord};
use hookscope_testing::{CaptureBuilder, TestEnv};
use serde_json::json;

fn record_equal(a: &WebhookRecord, b: &WebhookRecord) -> bool {
    a.id == b.id
        && a.method == b.method
        && a.pathname == b.pathname
        && a.ip == b.ip
        && a.status_code == b.status_code
        && a.content_type == b.content_type
        && a.content_length == b.content_length
        && a.query_params.as_ref().map(|j| &j.0) == b.query_params.as_ref().map(|j| &j.0)
        && a.headers.as_ref().map(|j| &j.0) == b.headers.as_ref().map(|j| &j.0)
        && a.body == b.body
        && a.created_at == b.created_at
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn insert_then_find_returns_an_equal_record() {
    let env = TestEnv::new().await.expect("test env setup");

    let record = WebhookRecord::new(
        "POST".to_string(),
        "/payments".to_string(),
        "203.0.113.99".to_string(),
        Some("application/json".to_string()),
        Some(11),
        Some([("mode".to_string(), "live".to_string())].into()),
        Some([("user-agent".to_string(), "stripe/1.0".to_string())].into()),
        Some(r#"{"ok":true}"#.to_string()),
        env.now_utc(),
    );

    let id = env.storage().webhooks.insert(&record).await.expect("insert record");
    assert_eq!(id, record.id);

    let found = env
        .storage()
        .webhooks
        .find_by_id(id)
        .await
        .expect("query record")
        .expect("record exists");

    assert!(record_equal(&record, &found), "stored record must equal the captured one");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn delete_semantics_match_the_contract() {
    let env = TestEnv::new().await.expect("test env setup");

    let unknown = WebhookId::generate();
    assert!(!env.storage().webhooks.delete_by_id(unknown).await.expect("delete unknown"));

    let id = env.capture_json("/x", &json!({"n": 1})).await.expect("insert capture");

    assert!(env.storage().webhooks.delete_by_id(id).await.expect("first delete"));
    assert!(!env.storage().webhooks.delete_by_id(id).await.expect("second delete"));
    assert!(env.storage().webhooks.find_by_id(id).await.expect("query").is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn pagination_returns_each_record_exactly_once() {
    let env = TestEnv::new().await.expect("test env setup");

    let mut inserted = Vec::new();
    for i in 0..55 {
        inserted.push(env.capture_json("/seq", &json!({"i": i})).await.expect("insert"));
    }

    let mut walked = Vec::new();
    let mut cursor = None;
    loop {
        let page = env.storage().webhooks.list_page(cursor, 20).await.expect("list page");
        walked.extend(page.records.iter().map(|r| r.id));

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(walked.len(), 55);

    let mut expected = inserted.clone();
    expected.reverse();
    assert_eq!(walked, expected, "walk must cover every record newest-first");
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn full_final_page_sets_a_cursor_that_ends_empty() {
    let env = TestEnv::new().await.expect("test env setup");

    for i in 0..20 {
        env.capture_json("/exact", &json!({"i": i})).await.expect("insert");
    }

    // Exactly one full page: a cursor is still handed out because the
    // store cannot know the data ended on the page boundary.
    let page = env.storage().webhooks.list_page(None, 20).await.expect("first page");
    assert_eq!(page.records.len(), 20);
    let cursor = page.next_cursor.expect("full page carries a cursor");

    let tail = env.storage().webhooks.list_page(Some(cursor), 20).await.expect("tail page");
    assert!(tail.records.is_empty());
    assert!(tail.next_cursor.is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn deletes_shorten_later_pages_without_ending_the_walk_early() {
    let env = TestEnv::new().await.expect("test env setup");

    let mut inserted = Vec::new();
    for i in 0..25 {
        inserted.push(env.capture_json("/d", &json!({"i": i})).await.expect("insert"));
    }

    let first = env.storage().webhooks.list_page(None, 20).await.expect("first page");
    let cursor = first.next_cursor.expect("cursor present");

    // Delete two records that the second page would have returned.
    env.storage().webhooks.delete_by_id(inserted[1]).await.expect("delete");
    env.storage().webhooks.delete_by_id(inserted[3]).await.expect("delete");

    let second = env.storage().webhooks.list_page(Some(cursor), 20).await.expect("second page");
    assert_eq!(second.records.len(), 3);
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
#[ignore = "requires PostgreSQL (set DATABASE_URL)"]
async fn count_tracks_inserts_and_deletes() {
    let env = TestEnv::new().await.expect("test env setup");

    assert_eq!(env.count().await.expect("count"), 0);

    let id = env
        .capture(&CaptureBuilder::new().pathname("/counted").build())
        .await
        .expect("insert");
    assert_eq!(env.count().await.expect("count"), 1);

    env.storage().webhooks.delete_by_id(id).await.expect("delete");
    assert_eq!(env.count().await.expect("count"), 0);
}
