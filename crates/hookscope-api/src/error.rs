//! API error taxonomy with stable codes and HTTP status mapping.
//!
//! Every failure leaving the HTTP surface is rendered as
//! `{ "error": { "code", "message" } }` so clients can branch on the code
//! without parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hookscope_core::{CoreError, WebhookId};
use serde::Serialize;
use thiserror::Error;

/// Error response envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the taxonomy (E1001-E3001).
    pub code: String,
    /// Human-readable error description.
    pub message: String,
}

/// API error types with codes for client disambiguation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pagination cursor is not a well-formed identifier (E1001).
    #[error("[E1001] Invalid cursor: {cursor:?} is not a well-formed webhook id")]
    InvalidCursor {
        /// The cursor value that failed to parse.
        cursor: String,
    },

    /// Path identifier is not a well-formed identifier (E1001).
    #[error("[E1001] Invalid identifier: {id:?} is not a well-formed webhook id")]
    InvalidId {
        /// The identifier that failed to parse.
        id: String,
    },

    /// Generate was called with no record identifiers (E1002).
    #[error("[E1002] Empty selection: at least one webhook id is required")]
    EmptySelection,

    /// Capture payload exceeds the configured size limit (E1003).
    #[error("[E1003] Payload too large: size {size_bytes} bytes exceeds the capture limit")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes.
        size_bytes: usize,
    },

    /// Generate selection mixes payload shapes (E1004).
    #[error("[E1004] Mixed payload shapes: {detail}")]
    MixedShapes {
        /// Description of the conflicting shapes.
        detail: String,
    },

    /// Record not found (E2001).
    #[error("[E2001] Not found: webhook {id} does not exist")]
    NotFound {
        /// The identifier that matched no record.
        id: WebhookId,
    },

    /// Storage failure (E3001).
    #[error("[E3001] Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Returns the error code (E1001-E3001).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCursor { .. } | Self::InvalidId { .. } => "E1001",
            Self::EmptySelection => "E1002",
            Self::PayloadTooLarge { .. } => "E1003",
            Self::MixedShapes { .. } => "E1004",
            Self::NotFound { .. } => "E2001",
            Self::Storage(_) => "E3001",
        }
    }

    /// Returns the HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCursor { .. } | Self::InvalidId { .. } | Self::EmptySelection => {
                StatusCode::BAD_REQUEST
            },
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MixedShapes { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        // Handlers map not-found themselves, with the id in hand; anything
        // reaching this conversion is a storage failure.
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail { code: self.code().to_string(), message: self.to_string() },
        };

        (self.status(), Json(body)).into_response()
    }
}
