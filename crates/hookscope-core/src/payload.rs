//! Body classification for captured requests.
//!
//! Callers never branch on raw content-type strings; everything a body can
//! be is expressed here as a tagged variant, which is the explicit input
//! domain of handler-code generation.

use std::fmt;

use serde_json::Value;

/// Classified body of a captured request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON object body.
    JsonObject(serde_json::Map<String, Value>),
    /// JSON array body.
    JsonArray(Vec<Value>),
    /// `application/x-www-form-urlencoded` body, decoded pairs in order.
    Form(Vec<(String, String)>),
    /// Body text that is neither JSON nor form-encoded.
    Text(String),
    /// No body.
    Empty,
}

/// Coarse payload category, used to detect heterogeneous selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadCategory {
    /// JSON object.
    JsonObject,
    /// JSON array.
    JsonArray,
    /// Form-encoded.
    Form,
    /// Plain text.
    Text,
    /// No body.
    Empty,
}

impl fmt::Display for PayloadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonObject => write!(f, "json object"),
            Self::JsonArray => write!(f, "json array"),
            Self::Form => write!(f, "form"),
            Self::Text => write!(f, "text"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

impl Payload {
    /// Classifies a body using its declared content type, falling back to
    /// sniffing JSON when no content type was sent.
    ///
    /// A declared JSON content type with an unparseable body degrades to
    /// [`Payload::Text`]; classification is best-effort and never fails.
    pub fn classify(content_type: Option<&str>, body: Option<&str>) -> Self {
        let Some(body) = body.filter(|b| !b.is_empty()) else {
            return Self::Empty;
        };

        match content_type.map(|ct| ct.to_ascii_lowercase()) {
            Some(ct) if ct.contains("json") => Self::parse_json(body),
            Some(ct) if ct.contains("x-www-form-urlencoded") => {
                let pairs: Vec<(String, String)> = url::form_urlencoded::parse(body.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                if pairs.is_empty() {
                    Self::Text(body.to_string())
                } else {
                    Self::Form(pairs)
                }
            },
            Some(_) => Self::Text(body.to_string()),
            None => Self::parse_json(body),
        }
    }

    fn parse_json(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Self::JsonObject(map),
            Ok(Value::Array(items)) => Self::JsonArray(items),
            _ => Self::Text(body.to_string()),
        }
    }

    /// Returns the coarse category of this payload.
    pub fn category(&self) -> PayloadCategory {
        match self {
            Self::JsonObject(_) => PayloadCategory::JsonObject,
            Self::JsonArray(_) => PayloadCategory::JsonArray,
            Self::Form(_) => PayloadCategory::Form,
            Self::Text(_) => PayloadCategory::Text,
            Self::Empty => PayloadCategory::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_object_classified_by_content_type() {
        let payload = Payload::classify(Some("application/json"), Some(r#"{"a":1}"#));
        assert!(matches!(payload, Payload::JsonObject(_)));
    }

    #[test]
    fn json_content_type_with_charset_still_parses() {
        let payload =
            Payload::classify(Some("application/json; charset=utf-8"), Some(r#"[1,2,3]"#));
        assert!(matches!(payload, Payload::JsonArray(_)));
    }

    #[test]
    fn invalid_json_degrades_to_text() {
        let payload = Payload::classify(Some("application/json"), Some("{not json"));
        assert_eq!(payload, Payload::Text("{not json".to_string()));
    }

    #[test]
    fn json_scalar_degrades_to_text() {
        let payload = Payload::classify(Some("application/json"), Some("42"));
        assert_eq!(payload, Payload::Text("42".to_string()));
    }

    #[test]
    fn form_body_decodes_pairs_in_order() {
        let payload = Payload::classify(
            Some("application/x-www-form-urlencoded"),
            Some("event=charge&amount=42"),
        );
        assert_eq!(
            payload,
            Payload::Form(vec![
                ("event".to_string(), "charge".to_string()),
                ("amount".to_string(), "42".to_string()),
            ])
        );
    }

    #[test]
    fn missing_content_type_sniffs_json() {
        let payload = Payload::classify(None, Some(r#"{"sniffed":true}"#));
        assert!(matches!(payload, Payload::JsonObject(_)));

        let payload = Payload::classify(None, Some("plain words"));
        assert_eq!(payload, Payload::Text("plain words".to_string()));
    }

    #[test]
    fn absent_or_empty_body_is_empty() {
        assert_eq!(Payload::classify(Some("application/json"), None), Payload::Empty);
        assert_eq!(Payload::classify(None, Some("")), Payload::Empty);
    }
}
