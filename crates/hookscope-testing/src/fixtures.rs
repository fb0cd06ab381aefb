//! Test data builders for captured requests.
//!
//! Builder pattern with sensible defaults so tests only spell out the
//! parts they assert on.

use std::collections::HashMap;

use serde_json::Value;

/// Builder for test captures.
pub struct CaptureBuilder {
    method: String,
    pathname: String,
    ip: String,
    content_type: Option<String>,
    query_params: Option<HashMap<String, String>>,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl CaptureBuilder {
    /// Creates a capture builder with sensible defaults: a JSON POST to
    /// `/orders` from a documentation-range address.
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("user-agent".to_string(), "TestClient/1.0".to_string());

        Self {
            method: "POST".to_string(),
            pathname: "/orders".to_string(),
            ip: "203.0.113.10".to_string(),
            content_type: Some("application/json".to_string()),
            query_params: None,
            headers,
            body: Some(r#"{"event":"order.created"}"#.to_string()),
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    /// Sets the source address.
    #[must_use]
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }

    /// Adds an HTTP header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets a JSON payload, adjusting the content type.
    #[must_use]
    pub fn json_body(mut self, value: &Value) -> Self {
        self.body = Some(value.to_string());
        self.content_type = Some("application/json".to_string());
        self.headers.insert("content-type".to_string(), "application/json".to_string());
        self
    }

    /// Sets a form-encoded payload, adjusting the content type.
    #[must_use]
    pub fn form_body(mut self, pairs: &[(&str, &str)]) -> Self {
        let encoded: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.body = Some(encoded.join("&"));
        self.content_type = Some("application/x-www-form-urlencoded".to_string());
        self.headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        self
    }

    /// Sets a plain text payload, adjusting the content type.
    #[must_use]
    pub fn text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = Some("text/plain".to_string());
        self.headers.insert("content-type".to_string(), "text/plain".to_string());
        self
    }

    /// Removes the payload and content type entirely.
    #[must_use]
    pub fn no_body(mut self) -> Self {
        self.body = None;
        self.content_type = None;
        self.headers.remove("content-type");
        self
    }

    /// Builds the capture.
    pub fn build(self) -> TestCapture {
        TestCapture {
            method: self.method,
            pathname: self.pathname,
            ip: self.ip,
            content_type: self.content_type,
            query_params: self.query_params,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for CaptureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Test capture data, the input side of a stored record.
#[derive(Debug, Clone)]
pub struct TestCapture {
    /// HTTP method of the simulated request.
    pub method: String,
    /// Request path.
    pub pathname: String,
    /// Source address.
    pub ip: String,
    /// Content type, when the request carries a body.
    pub content_type: Option<String>,
    /// Query string parameters.
    pub query_params: Option<HashMap<String, String>>,
    /// HTTP headers.
    pub headers: HashMap<String, String>,
    /// Body text.
    pub body: Option<String>,
}
