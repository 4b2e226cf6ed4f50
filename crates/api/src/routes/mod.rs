pub mod health;
pub mod place;

use axum::Router;

use crate::state::AppState;

/// Build the resource route tree.
///
/// Route hierarchy:
///
/// ```text
/// /places                                          list, create
/// /places/{id}                                     get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/places", place::router())
}
