//! Domain model structs and DTOs.
//!
//! The row struct derives `FromRow` + `Serialize`; the create and update
//! DTOs come from `places_core`, already validated.

pub mod place;
