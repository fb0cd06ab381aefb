//! Handler-code generation from captured payloads.
//!
//! Takes the classified payloads of a selection of records and renders a
//! text skeleton of an axum handler for payloads of that shape. Output is
//! best-effort templating: deterministic for a given selection, with no
//! schema guarantees.
//!
//! Selections mixing payload categories (a JSON object next to a form
//! body, say) are rejected rather than merged; bodyless captures are
//! shape-neutral and never conflict with anything.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::payload::{Payload, PayloadCategory};

/// Errors from handler-code generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    /// The selection contained no payloads.
    #[error("cannot generate a handler from an empty selection")]
    EmptySelection,

    /// The selection mixed payload categories.
    #[error("selection mixes {first} and {second} payloads")]
    MixedShapes {
        /// Category of the first shaped payload seen.
        first: PayloadCategory,
        /// The conflicting category.
        second: PayloadCategory,
    },
}

/// Generates an axum handler skeleton for the given payloads.
///
/// All shaped payloads must share one category; field unions are computed
/// across the selection, so a field missing from some records becomes
/// optional and a field whose value type varies widens to a raw JSON
/// value. Output field order is alphabetical, making generation
/// deterministic for a given selection.
pub fn generate_handler(payloads: &[Payload]) -> Result<String, CodegenError> {
    if payloads.is_empty() {
        return Err(CodegenError::EmptySelection);
    }

    let shaped: Vec<&Payload> =
        payloads.iter().filter(|p| p.category() != PayloadCategory::Empty).collect();

    let Some(first) = shaped.first() else {
        return Ok(render_empty(payloads.len()));
    };

    let category = first.category();
    if let Some(conflict) = shaped.iter().find(|p| p.category() != category) {
        return Err(CodegenError::MixedShapes { first: category, second: conflict.category() });
    }

    Ok(match category {
        PayloadCategory::JsonObject => render_json_object(&shaped),
        PayloadCategory::JsonArray => render_json_array(shaped.len()),
        PayloadCategory::Form => render_form(&shaped),
        PayloadCategory::Text => render_text(shaped.len()),
        PayloadCategory::Empty => unreachable!("empty payloads were filtered out"),
    })
}

/// Accumulated knowledge about one payload field across the selection.
struct FieldInfo {
    ty: Option<ScalarType>,
    saw_null: bool,
    seen_in: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    Int,
    Float,
    Bool,
    Str,
    Any,
}

impl ScalarType {
    fn of(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(_) => Some(Self::Bool),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Int),
            serde_json::Value::Number(_) => Some(Self::Float),
            serde_json::Value::String(_) => Some(Self::Str),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Some(Self::Any),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Any,
        }
    }

    fn rust_type(self) -> &'static str {
        match self {
            Self::Int => "i64",
            Self::Float => "f64",
            Self::Bool => "bool",
            Self::Str => "String",
            Self::Any => "serde_json::Value",
        }
    }
}

fn render_json_object(payloads: &[&Payload]) -> String {
    let mut fields: BTreeMap<String, FieldInfo> = BTreeMap::new();

    for payload in payloads {
        let Payload::JsonObject(map) = payload else { continue };
        for (key, value) in map {
            let info = fields
                .entry(key.clone())
                .or_insert(FieldInfo { ty: None, saw_null: false, seen_in: 0 });
            info.seen_in += 1;
            match ScalarType::of(value) {
                Some(ty) => info.ty = Some(info.ty.map_or(ty, |prev| prev.merge(ty))),
                None => info.saw_null = true,
            }
        }
    }

    let mut out = header(payloads.len(), "JSON object");
    out.push_str("#[derive(Debug, serde::Deserialize)]\npub struct WebhookPayload {\n");
    for (key, info) in &fields {
        push_field(&mut out, key, info, payloads.len(), |ty| ty.rust_type());
    }
    out.push_str("}\n\n");
    out.push_str(
        "pub async fn handle_webhook(\n    \
         axum::Json(payload): axum::Json<WebhookPayload>,\n\
         ) -> axum::http::StatusCode {\n    \
         // TODO: replace with real handling logic.\n    \
         tracing::info!(?payload, \"webhook received\");\n    \
         axum::http::StatusCode::OK\n}\n",
    );
    out
}

fn render_form(payloads: &[&Payload]) -> String {
    let mut fields: BTreeMap<String, FieldInfo> = BTreeMap::new();

    for payload in payloads {
        let Payload::Form(pairs) = payload else { continue };
        let mut seen_keys = Vec::new();
        for (key, _) in pairs {
            // Repeated form keys only count once per payload.
            if seen_keys.contains(&key) {
                continue;
            }
            seen_keys.push(key);
            let info = fields
                .entry(key.clone())
                .or_insert(FieldInfo { ty: Some(ScalarType::Str), saw_null: false, seen_in: 0 });
            info.seen_in += 1;
        }
    }

    let mut out = header(payloads.len(), "form-encoded");
    out.push_str("#[derive(Debug, serde::Deserialize)]\npub struct WebhookPayload {\n");
    for (key, info) in &fields {
        push_field(&mut out, key, info, payloads.len(), |_| "String");
    }
    out.push_str("}\n\n");
    out.push_str(
        "pub async fn handle_webhook(\n    \
         axum::Form(payload): axum::Form<WebhookPayload>,\n\
         ) -> axum::http::StatusCode {\n    \
         // TODO: replace with real handling logic.\n    \
         tracing::info!(?payload, \"webhook received\");\n    \
         axum::http::StatusCode::OK\n}\n",
    );
    out
}

fn render_json_array(count: usize) -> String {
    let mut out = header(count, "JSON array");
    out.push_str(
        "pub async fn handle_webhook(\n    \
         axum::Json(items): axum::Json<Vec<serde_json::Value>>,\n\
         ) -> axum::http::StatusCode {\n    \
         // TODO: replace with real handling logic.\n    \
         tracing::info!(count = items.len(), \"webhook received\");\n    \
         axum::http::StatusCode::OK\n}\n",
    );
    out
}

fn render_text(count: usize) -> String {
    let mut out = header(count, "plain text");
    out.push_str(
        "pub async fn handle_webhook(body: String) -> axum::http::StatusCode {\n    \
         // TODO: replace with real handling logic.\n    \
         tracing::info!(bytes = body.len(), \"webhook received\");\n    \
         axum::http::StatusCode::OK\n}\n",
    );
    out
}

fn render_empty(count: usize) -> String {
    let mut out = header(count, "bodyless");
    out.push_str(
        "pub async fn handle_webhook() -> axum::http::StatusCode {\n    \
         // TODO: replace with real handling logic.\n    \
         tracing::info!(\"webhook received\");\n    \
         axum::http::StatusCode::OK\n}\n",
    );
    out
}

fn header(count: usize, kind: &str) -> String {
    format!(
        "// Skeleton inferred from {count} captured {kind} payload{}.\n\
         // Field types are a best-effort guess; verify before use.\n\n",
        if count == 1 { "" } else { "s" }
    )
}

fn push_field(
    out: &mut String,
    key: &str,
    info: &FieldInfo,
    total: usize,
    type_name: impl Fn(ScalarType) -> &'static str,
) {
    let base = info.ty.map_or("serde_json::Value", type_name);
    let optional = info.saw_null || info.seen_in < total;
    let ty = if optional { format!("Option<{base}>") } else { base.to_string() };

    let (name, renamed) = rust_field_name(key);
    if renamed {
        out.push_str(&format!("    #[serde(rename = \"{key}\")]\n"));
    }
    out.push_str(&format!("    pub {name}: {ty},\n"));
}

/// Maps a payload key to a Rust field name, reporting whether a serde
/// rename is required to preserve the original key.
fn rust_field_name(raw: &str) -> (String, bool) {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    if name.is_empty() || name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if is_keyword(&name) {
        name = format!("r#{name}");
        // Raw identifiers deserialize under their bare name, so the
        // original key still needs no rename.
        return (name, false);
    }

    let renamed = name != raw;
    (name, renamed)
}

fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "super"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: serde_json::Value) -> Payload {
        Payload::classify(Some("application/json"), Some(&value.to_string()))
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert_eq!(generate_handler(&[]), Err(CodegenError::EmptySelection));
    }

    #[test]
    fn single_object_produces_struct_with_inferred_types() {
        let code = generate_handler(&[object(json!({
            "id": 7,
            "amount": 9.5,
            "paid": true,
            "customer": "acme",
            "metadata": {"plan": "pro"},
        }))])
        .expect("generate");

        assert!(code.contains("pub struct WebhookPayload"));
        assert!(code.contains("pub id: i64,"));
        assert!(code.contains("pub amount: f64,"));
        assert!(code.contains("pub paid: bool,"));
        assert!(code.contains("pub customer: String,"));
        assert!(code.contains("pub metadata: serde_json::Value,"));
        assert!(code.contains("axum::Json<WebhookPayload>"));
    }

    #[test]
    fn field_missing_from_some_records_becomes_optional() {
        let code = generate_handler(&[
            object(json!({"id": 1, "note": "hi"})),
            object(json!({"id": 2})),
        ])
        .expect("generate");

        assert!(code.contains("pub id: i64,"));
        assert!(code.contains("pub note: Option<String>,"));
    }

    #[test]
    fn null_value_makes_field_optional() {
        let code =
            generate_handler(&[object(json!({"ref_id": null})), object(json!({"ref_id": "r-1"}))])
                .expect("generate");

        assert!(code.contains("pub ref_id: Option<String>,"));
    }

    #[test]
    fn conflicting_types_widen() {
        let code = generate_handler(&[
            object(json!({"count": 1, "mixed": "text"})),
            object(json!({"count": 2.5, "mixed": true})),
        ])
        .expect("generate");

        assert!(code.contains("pub count: f64,"));
        assert!(code.contains("pub mixed: serde_json::Value,"));
    }

    #[test]
    fn non_identifier_keys_get_serde_renames() {
        let code = generate_handler(&[object(json!({"X-Request-Id": "abc"}))]).expect("generate");

        assert!(code.contains("#[serde(rename = \"X-Request-Id\")]"));
        assert!(code.contains("pub x_request_id: String,"));
    }

    #[test]
    fn keyword_keys_become_raw_identifiers() {
        let code = generate_handler(&[object(json!({"type": "charge"}))]).expect("generate");

        assert!(code.contains("pub r#type: String,"));
        assert!(!code.contains("rename = \"type\""));
    }

    #[test]
    fn form_payloads_use_the_form_extractor() {
        let forms = [
            Payload::Form(vec![("event".into(), "charge".into()), ("id".into(), "1".into())]),
            Payload::Form(vec![("event".into(), "refund".into())]),
        ];
        let code = generate_handler(&forms).expect("generate");

        assert!(code.contains("axum::Form<WebhookPayload>"));
        assert!(code.contains("pub event: String,"));
        assert!(code.contains("pub id: Option<String>,"));
    }

    #[test]
    fn array_payloads_produce_a_vec_handler() {
        let code = generate_handler(&[Payload::JsonArray(vec![json!(1)])]).expect("generate");
        assert!(code.contains("axum::Json<Vec<serde_json::Value>>"));
    }

    #[test]
    fn text_payloads_produce_a_raw_body_handler() {
        let code = generate_handler(&[Payload::Text("hello".into())]).expect("generate");
        assert!(code.contains("handle_webhook(body: String)"));
    }

    #[test]
    fn bodyless_selection_produces_a_bare_handler() {
        let code = generate_handler(&[Payload::Empty, Payload::Empty]).expect("generate");
        assert!(code.contains("pub async fn handle_webhook()"));
    }

    #[test]
    fn bodyless_captures_do_not_conflict_with_shaped_ones() {
        let code =
            generate_handler(&[Payload::Empty, object(json!({"id": 1}))]).expect("generate");
        assert!(code.contains("pub id: i64,"));
    }

    #[test]
    fn mixed_categories_are_rejected() {
        let err = generate_handler(&[
            object(json!({"id": 1})),
            Payload::Form(vec![("id".into(), "1".into())]),
        ])
        .expect_err("mixed shapes must be rejected");

        assert_eq!(
            err,
            CodegenError::MixedShapes {
                first: PayloadCategory::JsonObject,
                second: PayloadCategory::Form,
            }
        );
    }

    #[test]
    fn output_is_deterministic() {
        let payloads =
            [object(json!({"b": 1, "a": "x"})), object(json!({"a": "y", "c": false}))];
        assert_eq!(generate_handler(&payloads), generate_handler(&payloads));
    }
}
