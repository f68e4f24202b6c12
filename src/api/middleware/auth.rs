//! Bearer-token authentication middleware.

use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use axum::Extension;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

/// Require `Authorization: Bearer <token>` when a token is configured.
/// With no token configured every request passes (development mode).
pub async fn require_auth(
    Extension(ctx): Extension<ApiContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = ctx.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized),
    }
}
