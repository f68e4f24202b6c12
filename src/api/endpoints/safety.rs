//! Drug-safety evaluation endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyRequest {
    pub medicines: Option<Vec<String>>,
    pub patient_age: Option<u32>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyResponse {
    pub message: String,
    pub safety_report: Value,
}

/// POST /api/ai/drug-safety
pub async fn check_drug_safety(
    State(ctx): State<ApiContext>,
    Json(request): Json<SafetyRequest>,
) -> Result<Json<SafetyResponse>, ApiError> {
    // Only absence is an input error; an empty list is forwarded as-is.
    let medicines = request
        .medicines
        .ok_or_else(|| ApiError::BadRequest("Medicines array is required".to_string()))?;

    let report = ctx
        .services
        .check_drug_safety(&medicines, request.patient_age, &request.conditions)
        .await
        .map_err(|e| ApiError::internal("Error checking drug safety", e))?;

    Ok(Json(SafetyResponse {
        message: "Drug safety check completed".to_string(),
        safety_report: report,
    }))
}
