//! Property-based tests for identifiers, classification, and generation.

use hookscope_core::{codegen, Payload, PayloadCategory, WebhookId};
use proptest::prelude::*;

proptest! {
    /// Identifier generation order always matches sort order, which is the
    /// foundation of the keyset pagination contract.
    #[test]
    fn identifiers_sort_in_generation_order(count in 2usize..200) {
        let ids: Vec<WebhookId> = (0..count).map(|_| WebhookId::generate()).collect();

        let mut sorted = ids.clone();
        sorted.sort();

        prop_assert_eq!(ids, sorted);
    }

    /// Classification is total: any content type and body combination maps
    /// to some category without panicking.
    #[test]
    fn classification_never_panics(
        content_type in proptest::option::of("[ -~]{0,40}"),
        body in proptest::option::of("\\PC{0,200}"),
    ) {
        let payload = Payload::classify(content_type.as_deref(), body.as_deref());

        match (&body, payload.category()) {
            (None, category) => prop_assert_eq!(category, PayloadCategory::Empty),
            (Some(b), PayloadCategory::Empty) => prop_assert!(b.is_empty()),
            _ => {},
        }
    }

    /// Generation over any single-category selection of JSON objects
    /// succeeds and stays deterministic.
    #[test]
    fn json_object_generation_is_total_and_deterministic(
        keys in proptest::collection::vec("[a-z]{1,8}", 1..6),
        values in proptest::collection::vec(0i64..1000, 1..6),
    ) {
        let map: serde_json::Map<String, serde_json::Value> = keys
            .iter()
            .zip(values.iter())
            .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
            .collect();

        let payloads = vec![Payload::JsonObject(map.clone()), Payload::JsonObject(map)];

        let first = codegen::generate_handler(&payloads);
        let second = codegen::generate_handler(&payloads);

        prop_assert!(first.is_ok());
        prop_assert_eq!(first, second);
    }

    /// Text selections always generate, whatever the body text contains.
    #[test]
    fn text_generation_is_total(body in "\\PC{1,200}") {
        let payloads = vec![Payload::Text(body)];
        prop_assert!(codegen::generate_handler(&payloads).is_ok());
    }
}
