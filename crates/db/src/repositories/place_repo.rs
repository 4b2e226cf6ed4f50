//! Repository for the `places` table.

use async_trait::async_trait;
use places_core::types::DbId;
use sqlx::PgPool;

use crate::models::place::{CreatePlace, Place, UpdatePlace};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, city, state, created_at, updated_at";

/// Unique index guarding `places.slug`.
pub const SLUG_CONSTRAINT: &str = "uq_places_slug";

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Errors a place store can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write would have produced two places with the same slug.
    #[error("Duplicate value violates unique constraint: uq_places_slug")]
    DuplicateSlug,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Typed data access for places.
///
/// Implementations must enforce slug uniqueness themselves at write time;
/// [`PlaceStore::slug_taken`] is only an early check and can race.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Insert a new place, returning the stored row with its assigned id.
    async fn insert(&self, input: &CreatePlace) -> Result<Place, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Place>, StoreError>;

    /// All places, or those whose name contains `name_filter`.
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Place>, StoreError>;

    /// Whether another place already uses `slug`. `except` excludes one id
    /// so a place can keep its own slug on update.
    async fn slug_taken(&self, slug: &str, except: Option<DbId>) -> Result<bool, StoreError>;

    /// Apply the non-`None` fields. Returns `None` if no row has `id`.
    async fn update(&self, id: DbId, input: &UpdatePlace) -> Result<Option<Place>, StoreError>;

    /// Hard-delete a place. Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// PostgreSQL-backed [`PlaceStore`].
#[derive(Debug, Clone)]
pub struct PgPlaceRepo {
    pool: PgPool,
}

impl PgPlaceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PlaceStore for PgPlaceRepo {
    async fn insert(&self, input: &CreatePlace) -> Result<Place, StoreError> {
        let query = format!(
            "INSERT INTO places (name, slug, city, state) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.city)
            .bind(&input.state)
            .fetch_one(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Place>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM places WHERE id = $1");
        let place = sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(place)
    }

    /// Without a filter, returns rows in table order; no sort is imposed.
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Place>, StoreError> {
        let places = match name_filter {
            // PostgreSQL text cannot hold NUL, so no stored name contains one.
            Some(filter) if filter.contains('\0') => Vec::new(),
            Some(filter) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM places \
                     WHERE name LIKE '%' || $1 || '%' ESCAPE '\\'"
                );
                sqlx::query_as::<_, Place>(&query)
                    .bind(escape_like(filter))
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM places");
                sqlx::query_as::<_, Place>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(places)
    }

    async fn slug_taken(&self, slug: &str, except: Option<DbId>) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM places WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2)\
             )",
        )
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update(&self, id: DbId, input: &UpdatePlace) -> Result<Option<Place>, StoreError> {
        let query = format!(
            "UPDATE places SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                city = COALESCE($4, city), \
                state = COALESCE($5, state), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.city)
            .bind(&input.state)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

/// Map a unique violation on the slug index to [`StoreError::DuplicateSlug`].
fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            && db_err.constraint() == Some(SLUG_CONSTRAINT)
        {
            return StoreError::DuplicateSlug;
        }
    }
    StoreError::Database(err)
}

/// Escape `LIKE` metacharacters so the filter matches literally.
fn escape_like(filter: &str) -> String {
    let mut escaped = String::with_capacity(filter.len());
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
