//! API error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{message}")]
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn internal(message: &str, detail: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: message.to_string(),
            detail: Some(detail.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({ "message": message }))
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthorized" }),
            ),
            ApiError::Internal { message, detail } => {
                tracing::error!(error = ?detail, "{message}");
                let body = match detail {
                    Some(detail) => json!({ "message": message, "error": detail }),
                    None => json!({ "message": message }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoText => {
                ApiError::BadRequest("Could not extract any text from the image.".to_string())
            }
            other => ApiError::internal("Error processing prescription image.", other),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::internal("Database error.", err)
    }
}
