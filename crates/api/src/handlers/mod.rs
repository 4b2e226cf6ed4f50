//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to [`places_db::PlaceService`] and map errors via
//! [`AppError`](crate::error::AppError).

pub mod place;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Fallback for unmatched routes: a JSON 404 like every other error.
pub async fn fallback() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Resource not found",
            "code": "NOT_FOUND",
        })),
    )
}
