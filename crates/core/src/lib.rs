//! Domain building blocks for the places service.
//!
//! Everything here is free of I/O: shared types, the error taxonomy, and
//! the field rules a place must satisfy before it reaches the store.

pub mod error;
pub mod place;
pub mod types;
pub mod validation;
