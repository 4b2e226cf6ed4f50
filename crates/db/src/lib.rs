//! Persistence for places.
//!
//! Holds the row model, the [`PlaceStore`](repositories::PlaceStore)
//! abstraction with its PostgreSQL and in-memory implementations, and the
//! [`PlaceService`](service::PlaceService) that runs the five place
//! operations on top of a store.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod service;

pub use service::PlaceService;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply any pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
