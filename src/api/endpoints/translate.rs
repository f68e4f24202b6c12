//! Text translation endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub message: String,
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
}

/// POST /api/ai/translate
pub async fn translate(
    State(ctx): State<ApiContext>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required for translation".to_string()))?;

    let target = request.target_language.unwrap_or_else(|| "en".to_string());
    let source = request.source_language.unwrap_or_else(|| "auto".to_string());

    let translated = ctx
        .services
        .translate(&text, &target, &source)
        .await
        .map_err(|e| ApiError::internal("Error translating text", e))?;

    Ok(Json(TranslateResponse {
        message: "Translation completed".to_string(),
        original_text: text,
        translated_text: translated,
        source_language: source,
        target_language: target,
    }))
}
