//! Embedded browser UI.
//!
//! One static page, compiled into the binary. Everything dynamic happens
//! client-side against the JSON API.

use axum::response::Html;

/// Serves the list view.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}
