//! The place operations: list, create, get, update, delete.
//!
//! [`PlaceService`] runs validation from `places_core`, consults the store
//! for slug uniqueness, and translates [`StoreError`]s into the domain
//! [`CoreError`] taxonomy. It knows nothing about HTTP.

use std::sync::Arc;

use places_core::error::CoreError;
use places_core::place::{PlaceInput, FIELD_SLUG};
use places_core::types::DbId;
use places_core::validation::{unique_message, FieldErrors};

use crate::models::place::Place;
use crate::repositories::{PlaceStore, StoreError};

/// Entity label used in not-found errors.
pub const PLACE_ENTITY: &str = "Place";

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateSlug => {
                CoreError::Validation(FieldErrors::single(FIELD_SLUG, unique_message(FIELD_SLUG)))
            }
            StoreError::Database(err) => {
                tracing::error!(error = %err, "Place store failure");
                CoreError::Internal(err.to_string())
            }
        }
    }
}

/// Place operations over any [`PlaceStore`]. Cheap to clone.
#[derive(Clone)]
pub struct PlaceService {
    store: Arc<dyn PlaceStore>,
}

impl PlaceService {
    pub fn new(store: Arc<dyn PlaceStore>) -> Self {
        Self { store }
    }

    /// All places, or only those whose name contains `name_filter`.
    pub async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Place>, CoreError> {
        let places = self.store.list(name_filter).await?;
        tracing::debug!(count = places.len(), filter = ?name_filter, "Listed places");
        Ok(places)
    }

    /// Validate and insert a new place.
    ///
    /// Field errors and a taken slug are reported together. A slug claimed
    /// by a concurrent writer after the check surfaces as the same
    /// validation error through the store's unique constraint.
    pub async fn create(&self, input: &PlaceInput) -> Result<Place, CoreError> {
        let checked = input.validate_create();
        let slug_taken = self.slug_taken(input, None).await?;

        let new_place = match checked {
            Ok(new_place) if !slug_taken => new_place,
            Ok(_) => return Err(taken_slug(FieldErrors::new())),
            Err(errors) if slug_taken => return Err(taken_slug(errors)),
            Err(errors) => return Err(CoreError::Validation(errors)),
        };

        let place = self.store.insert(&new_place).await?;
        tracing::info!(place_id = place.id, slug = %place.slug, "Place created");
        Ok(place)
    }

    pub async fn get(&self, id: DbId) -> Result<Place, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found(PLACE_ENTITY, id))
    }

    /// Apply the fields present in `input` to an existing place.
    ///
    /// Existence is checked before validation, so an unknown id is always
    /// reported as not found whatever the input.
    pub async fn update(&self, id: DbId, input: &PlaceInput) -> Result<Place, CoreError> {
        let existing = self.get(id).await?;

        let checked = input.validate_update();
        let slug_taken = self.slug_taken(input, Some(id)).await?;

        let changes = match checked {
            Ok(changes) if !slug_taken => changes,
            Ok(_) => return Err(taken_slug(FieldErrors::new())),
            Err(errors) if slug_taken => return Err(taken_slug(errors)),
            Err(errors) => return Err(CoreError::Validation(errors)),
        };

        if changes.is_empty() {
            return Ok(existing);
        }

        let place = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found(PLACE_ENTITY, id))?;
        tracing::info!(place_id = place.id, "Place updated");
        Ok(place)
    }

    /// Permanently remove a place.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !self.store.delete(id).await? {
            return Err(CoreError::not_found(PLACE_ENTITY, id));
        }
        tracing::info!(place_id = id, "Place deleted");
        Ok(())
    }

    /// Whether the backing store is reachable.
    pub async fn is_healthy(&self) -> bool {
        match self.store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Place store health check failed");
                false
            }
        }
    }

    async fn slug_taken(&self, input: &PlaceInput, except: Option<DbId>) -> Result<bool, CoreError> {
        match input.checked_slug() {
            Some(slug) => Ok(self.store.slug_taken(&slug, except).await?),
            None => Ok(false),
        }
    }
}

fn taken_slug(mut errors: FieldErrors) -> CoreError {
    errors.add(FIELD_SLUG, unique_message(FIELD_SLUG));
    CoreError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::{json, Value};

    use super::*;
    use crate::models::place::{CreatePlace, UpdatePlace};
    use crate::repositories::MemoryPlaceRepo;

    fn service() -> (PlaceService, Arc<MemoryPlaceRepo>) {
        let repo = Arc::new(MemoryPlaceRepo::new());
        (PlaceService::new(repo.clone()), repo)
    }

    fn input(body: Value) -> PlaceInput {
        serde_json::from_value(body).unwrap()
    }

    fn airport() -> PlaceInput {
        input(json!({
            "name": "Airport",
            "slug": "cpv",
            "city": "Campina Grande",
            "state": "Paraiba",
        }))
    }

    fn named(name: &str, slug: &str) -> PlaceInput {
        input(json!({"name": name, "slug": slug, "city": "Joao Pessoa", "state": "Paraiba"}))
    }

    // -- create / get ---------------------------------------------------------

    #[tokio::test]
    async fn create_then_get_returns_same_place() {
        let (svc, _) = service();
        let created = svc.create(&airport()).await.unwrap();
        assert_eq!(created.name, "Airport");
        assert_eq!(created.slug, "cpv");
        assert_eq!(created.city, "Campina Grande");
        assert_eq!(created.state, "Paraiba");

        let fetched = svc.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_with_missing_fields_writes_nothing() {
        let (svc, repo) = service();
        let err = svc.create(&input(json!({"name": "Airport"}))).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["city", "slug", "state"]);
        });
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn create_with_duplicate_slug_names_slug() {
        let (svc, repo) = service();
        svc.create(&airport()).await.unwrap();

        let err = svc.create(&named("Other", "cpv")).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["slug"]);
            assert_eq!(errors.messages("slug"), ["The slug has already been taken."]);
        });
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_slug_is_reported_alongside_other_errors() {
        let (svc, _) = service();
        svc.create(&airport()).await.unwrap();

        let err = svc
            .create(&input(json!({"slug": "cpv", "city": "CG", "state": "PB"})))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["name", "slug"]);
        });
    }

    #[tokio::test]
    async fn get_missing_place_is_not_found() {
        let (svc, _) = service();
        assert_matches!(
            svc.get(99999).await,
            Err(CoreError::NotFound { entity: "Place", id }) if id == "99999"
        );
    }

    // -- list -----------------------------------------------------------------

    #[tokio::test]
    async fn list_returns_all_or_filtered() {
        let (svc, _) = service();
        assert!(svc.list(None).await.unwrap().is_empty());

        svc.create(&named("Airport CPV", "cpv")).await.unwrap();
        svc.create(&named("Airport JPA", "jpa")).await.unwrap();
        svc.create(&named("Bus Station", "bus")).await.unwrap();

        assert_eq!(svc.list(None).await.unwrap().len(), 3);

        let airports = svc.list(Some("Airport")).await.unwrap();
        let slugs: Vec<_> = airports.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["cpv", "jpa"]);

        assert!(svc.list(Some("Harbour")).await.unwrap().is_empty());
    }

    // -- update ---------------------------------------------------------------

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let (svc, _) = service();
        let created = svc.create(&airport()).await.unwrap();

        let updated = svc
            .update(created.id, &input(json!({"city": "JP"})))
            .await
            .unwrap();
        assert_eq!(updated.city, "JP");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.slug, created.slug);
        assert_eq!(updated.state, created.state);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_may_keep_own_slug() {
        let (svc, _) = service();
        let created = svc.create(&airport()).await.unwrap();

        let updated = svc
            .update(
                created.id,
                &input(json!({"name": "Airport", "slug": "cpv", "city": "Campina Grande", "state": "Paraiba"})),
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "cpv");
    }

    #[tokio::test]
    async fn update_rejects_slug_of_another_place() {
        let (svc, _) = service();
        let first = svc.create(&airport()).await.unwrap();
        svc.create(&named("Airport JPA", "jpa")).await.unwrap();

        let err = svc
            .update(first.id, &input(json!({"slug": "jpa", "city": "JP"})))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["slug"]);
        });
        assert_eq!(svc.get(first.id).await.unwrap().city, "Campina Grande");
    }

    #[tokio::test]
    async fn update_with_empty_name_names_name() {
        let (svc, _) = service();
        let created = svc.create(&airport()).await.unwrap();

        let err = svc
            .update(created.id, &input(json!({"name": ""})))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["name"]);
        });
        assert_eq!(svc.get(created.id).await.unwrap().name, "Airport");
    }

    #[tokio::test]
    async fn update_missing_place_is_not_found_regardless_of_input() {
        let (svc, _) = service();
        for body in [json!({"city": "JP"}), json!({"name": ""}), json!({})] {
            assert_matches!(
                svc.update(42, &input(body)).await,
                Err(CoreError::NotFound { .. })
            );
        }
    }

    #[tokio::test]
    async fn empty_update_returns_place_unchanged() {
        let (svc, _) = service();
        let created = svc.create(&airport()).await.unwrap();
        let same = svc.update(created.id, &input(json!({}))).await.unwrap();
        assert_eq!(same, created);
    }

    // -- delete ---------------------------------------------------------------

    #[tokio::test]
    async fn delete_removes_place() {
        let (svc, repo) = service();
        let created = svc.create(&airport()).await.unwrap();

        svc.delete(created.id).await.unwrap();
        assert_matches!(svc.get(created.id).await, Err(CoreError::NotFound { .. }));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn delete_missing_place_leaves_count_unchanged() {
        let (svc, repo) = service();
        svc.create(&airport()).await.unwrap();

        assert_matches!(svc.delete(99999).await, Err(CoreError::NotFound { .. }));
        assert_eq!(repo.len().await, 1);
    }

    // -- write-time slug race -------------------------------------------------

    /// Reports every slug as free, so only the store's own uniqueness check
    /// at write time can catch a duplicate, as when another writer claims
    /// the slug between the check and the write.
    struct StaleSlugCheck(MemoryPlaceRepo);

    #[async_trait::async_trait]
    impl PlaceStore for StaleSlugCheck {
        async fn insert(&self, input: &CreatePlace) -> Result<Place, StoreError> {
            self.0.insert(input).await
        }

        async fn find_by_id(&self, id: DbId) -> Result<Option<Place>, StoreError> {
            self.0.find_by_id(id).await
        }

        async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Place>, StoreError> {
            self.0.list(name_filter).await
        }

        async fn slug_taken(&self, _slug: &str, _except: Option<DbId>) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn update(&self, id: DbId, input: &UpdatePlace) -> Result<Option<Place>, StoreError> {
            self.0.update(id, input).await
        }

        async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
            self.0.delete(id).await
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            self.0.health_check().await
        }
    }

    fn racing_service() -> (PlaceService, Arc<StaleSlugCheck>) {
        let store = Arc::new(StaleSlugCheck(MemoryPlaceRepo::new()));
        (PlaceService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_losing_slug_race_is_validation_error() {
        let (svc, store) = racing_service();
        svc.create(&airport()).await.unwrap();

        let err = svc.create(&named("Other Airport", "cpv")).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["slug"]);
            assert_eq!(errors.messages("slug"), ["The slug has already been taken."]);
        });
        assert_eq!(store.0.len().await, 1);
    }

    #[tokio::test]
    async fn update_losing_slug_race_is_validation_error() {
        let (svc, _) = racing_service();
        svc.create(&airport()).await.unwrap();
        let other = svc.create(&named("Bus Station", "bus")).await.unwrap();

        let err = svc
            .update(other.id, &input(json!({"slug": "cpv"})))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["slug"]);
        });
        assert_eq!(svc.get(other.id).await.unwrap().slug, "bus");
    }

    // -- error translation ----------------------------------------------------

    #[test]
    fn duplicate_slug_store_error_becomes_validation() {
        let err = CoreError::from(StoreError::DuplicateSlug);
        assert_matches!(err, CoreError::Validation(errors) => {
            assert_eq!(errors.fields(), vec!["slug"]);
        });
    }

    #[test]
    fn database_store_error_becomes_internal() {
        let err = CoreError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        assert_matches!(err, CoreError::Internal(_));
    }
}
