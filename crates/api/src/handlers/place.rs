//! Handlers for the `/places` resource.
//!
//! Bodies are bare JSON (no envelope). Path ids that are not integers are
//! reported as not found, the same as integers with no matching row.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use places_core::error::CoreError;
use places_core::place::PlaceInput;
use places_core::types::DbId;
use places_db::service::PLACE_ENTITY;

use crate::error::AppResult;
use crate::query::PlaceListParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_id(raw: &str) -> Result<DbId, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::not_found(PLACE_ENTITY, raw))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /places?name=
///
/// List all places, optionally only those whose name contains `name`.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(pairs) = params?;
    let params = PlaceListParams::from(pairs);
    let places = state.places.list(params.name.as_deref()).await?;
    Ok(Json(places))
}

/// POST /places
///
/// Create a new place. Every field is required.
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<PlaceInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let place = state.places.create(&input).await?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// GET /places/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let place = state.places.get(id).await?;
    Ok(Json(place))
}

/// PUT /places/{id}
///
/// Update a place. Only the fields present in the body are changed.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    input: Result<Json<PlaceInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    // An unknown id is a 404 even when the body is unusable.
    let input = match input {
        Ok(Json(input)) => input,
        Err(rejection) => {
            state.places.get(id).await?;
            return Err(rejection.into());
        }
    };
    let place = state.places.update(id, &input).await?;
    Ok(Json(place))
}

/// DELETE /places/{id}
///
/// Permanently delete a place. Responds 204 with no body.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    state.places.delete(id).await?;
    Ok((StatusCode::NO_CONTENT, [(CONTENT_TYPE, "application/json")]))
}
