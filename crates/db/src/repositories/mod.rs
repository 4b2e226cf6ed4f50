//! Repository layer.
//!
//! [`PlaceStore`] is the data-access seam the service is written against.
//! [`PgPlaceRepo`] backs it with PostgreSQL; [`MemoryPlaceRepo`] keeps rows
//! in process for local runs without a database and for tests.

pub mod memory_place_repo;
pub mod place_repo;

pub use memory_place_repo::MemoryPlaceRepo;
pub use place_repo::{PgPlaceRepo, PlaceStore, StoreError};
