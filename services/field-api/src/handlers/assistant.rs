//! AI assistant handler.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use serde::{Deserialize, Serialize};

use analytics::FieldSnapshot;
use field_common::FieldError;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub field_data: Option<FieldSnapshot>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub recommendation: String,
    pub timestamp: String,
}

/// POST /api/ai-assistant
///
/// Rejects empty field data; every other outcome is a recommendation string.
pub async fn ai_assistant_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AssistantRequest>, JsonRejection>,
) -> ApiResult<Json<AssistantResponse>> {
    let Json(req) = payload?;
    let snapshot = req
        .field_data
        .filter(|snapshot| !snapshot.is_empty())
        .ok_or_else(|| FieldError::MissingParameter("field_data".to_string()))?;

    let recommendation = state
        .advisor
        .recommend(&snapshot, req.query.as_deref())
        .await;

    Ok(Json(AssistantResponse {
        recommendation,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
