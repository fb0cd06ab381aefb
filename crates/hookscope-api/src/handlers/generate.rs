//! Generator handler: synthesizes example handler code from a selection
//! of captured records.

use axum::{extract::State, Json};
use hookscope_core::{
    codegen::{self, CodegenError},
    Payload, WebhookId,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{error::ApiError, server::AppState};

/// Request body for code generation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Identifiers of the records to inspect. Must be non-empty.
    pub webhook_ids: Vec<String>,
}

/// Response carrying the generated handler skeleton.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// The generated code as text.
    pub code: String,
}

/// Generates a handler skeleton from the selected records' payloads.
///
/// Fetches every selected record; a missing record fails the whole
/// request rather than being silently skipped.
///
/// # Errors
///
/// - 400 when the id list is empty or contains a malformed id
/// - 404 when any selected record does not exist
/// - 422 when the selection mixes payload shapes
/// - 500 on storage failure
#[instrument(name = "generate_code", skip(state, request), fields(selection = request.webhook_ids.len()))]
pub async fn generate_code(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if request.webhook_ids.is_empty() {
        return Err(ApiError::EmptySelection);
    }

    let mut payloads: Vec<Payload> = Vec::with_capacity(request.webhook_ids.len());
    for raw in &request.webhook_ids {
        let id = raw
            .parse::<WebhookId>()
            .map_err(|_| ApiError::InvalidId { id: raw.clone() })?;

        let record = state
            .storage
            .webhooks
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound { id })?;

        payloads.push(record.payload());
    }

    let code = codegen::generate_handler(&payloads).map_err(|e| match e {
        CodegenError::EmptySelection => ApiError::EmptySelection,
        CodegenError::MixedShapes { .. } => ApiError::MixedShapes { detail: e.to_string() },
    })?;

    info!(selection = payloads.len(), "generated handler skeleton");

    Ok(Json(GenerateResponse { code }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_camel_case_ids() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"webhookIds": ["a", "b"]}"#).expect("deserialize");
        assert_eq!(request.webhook_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn snake_case_ids_are_rejected() {
        assert!(serde_json::from_str::<GenerateRequest>(r#"{"webhook_ids": []}"#).is_err());
    }
}
