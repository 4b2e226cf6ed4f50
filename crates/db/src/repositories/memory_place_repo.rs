//! In-process [`PlaceStore`] used when no database is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use places_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::place::{CreatePlace, Place, UpdatePlace};
use crate::repositories::place_repo::{PlaceStore, StoreError};

/// Places held in an ordered map behind a single lock.
///
/// Uniqueness is checked and the write applied under the same write guard,
/// so two concurrent writers can never both claim a slug. Ids start at 1
/// and are never reused, matching BIGSERIAL.
#[derive(Debug, Default)]
pub struct MemoryPlaceRepo {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: DbId,
    rows: BTreeMap<DbId, Place>,
}

impl Inner {
    fn slug_taken(&self, slug: &str, except: Option<DbId>) -> bool {
        self.rows
            .values()
            .any(|place| place.slug == slug && Some(place.id) != except)
    }
}

impl MemoryPlaceRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored places.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PlaceStore for MemoryPlaceRepo {
    async fn insert(&self, input: &CreatePlace) -> Result<Place, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.slug_taken(&input.slug, None) {
            return Err(StoreError::DuplicateSlug);
        }

        inner.last_id += 1;
        let now = Utc::now();
        let place = Place {
            id: inner.last_id,
            name: input.name.clone(),
            slug: input.slug.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(place.id, place.clone());
        Ok(place)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Place>, StoreError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Place>, StoreError> {
        let inner = self.inner.read().await;
        let places = inner
            .rows
            .values()
            .filter(|place| name_filter.map_or(true, |filter| place.name.contains(filter)))
            .cloned()
            .collect();
        Ok(places)
    }

    async fn slug_taken(&self, slug: &str, except: Option<DbId>) -> Result<bool, StoreError> {
        Ok(self.inner.read().await.slug_taken(slug, except))
    }

    async fn update(&self, id: DbId, input: &UpdatePlace) -> Result<Option<Place>, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(slug) = &input.slug {
            if inner.slug_taken(slug, Some(id)) {
                return Err(StoreError::DuplicateSlug);
            }
        }

        let Some(place) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            place.name = name.clone();
        }
        if let Some(slug) = &input.slug {
            place.slug = slug.clone();
        }
        if let Some(city) = &input.city {
            place.city = city.clone();
        }
        if let Some(state) = &input.state {
            place.state = state.clone();
        }
        place.updated_at = Utc::now();
        Ok(Some(place.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
