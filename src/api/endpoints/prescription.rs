//! Prescription image upload endpoint.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{PharmacyMatch, RecognizedMedicine};

/// Upload size ceiling for the prescription image.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub text: String,
    pub medicines: Vec<RecognizedMedicine>,
    pub pharmacies: Vec<PharmacyMatch>,
}

/// POST /api/ai/upload-prescription
///
/// Accepts a multipart form with an image in the `prescription` field, runs
/// the recognition pipeline and returns the recognized text, the resolved
/// medicines and the pharmacies stocking them.
pub async fn upload_prescription(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Invalid multipart request: {e}"))
    })? {
        if field.name() != Some("prescription") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::BadRequest(
                "Only image files are allowed.".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Could not read uploaded file: {e}")))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest(
                "Uploaded file exceeds the 10MB limit.".to_string(),
            ));
        }
        image = Some(bytes.to_vec());
        break;
    }

    let Some(image) = image else {
        return Err(ApiError::BadRequest(
            "No prescription image file uploaded.".to_string(),
        ));
    };

    tracing::info!(bytes = image.len(), "Processing prescription upload");
    let result = ctx.processor.process(&ctx.db, image).await?;

    Ok(Json(UploadResponse {
        text: result.text,
        medicines: result.medicines,
        pharmacies: result.pharmacies,
    }))
}
