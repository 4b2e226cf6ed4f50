//! Place entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use places_core::types::{DbId, Timestamp};

pub use places_core::place::{CreatePlace, UpdatePlace};

/// A row from the `places` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Place {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub state: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
