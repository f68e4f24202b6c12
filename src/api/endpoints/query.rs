//! Health-query endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Debug, Deserialize)]
pub struct HealthQueryRequest {
    pub query: Option<String>,
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Serialize)]
pub struct HealthQueryResponse {
    pub message: String,
    pub query: String,
    pub response: Value,
}

/// POST /api/ai/health-query
pub async fn health_query(
    State(ctx): State<ApiContext>,
    Json(request): Json<HealthQueryRequest>,
) -> Result<Json<HealthQueryResponse>, ApiError> {
    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Health query is required".to_string()))?;

    let response = ctx
        .services
        .health_query(&query, &request.context)
        .await
        .map_err(|e| ApiError::internal("Error processing health query", e))?;

    Ok(Json(HealthQueryResponse {
        message: "Health query processed".to_string(),
        query,
        response,
    }))
}
