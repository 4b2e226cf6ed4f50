use places_db::PlaceService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the service holds its store behind an `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Place operations over the configured store.
    pub places: PlaceService,
}
