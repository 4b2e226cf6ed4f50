//! Place input handling.
//!
//! [`PlaceInput`] is the raw request body: each attribute is kept as an
//! untyped JSON value so the field rules, not the deserializer, decide what
//! is acceptable. Validation turns it into a [`CreatePlace`] (every field
//! required) or an [`UpdatePlace`] (only submitted fields checked).
//!
//! Slug uniqueness needs the store and is checked by the caller.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::validation::{text_field, FieldErrors};

pub const FIELD_NAME: &str = "name";
pub const FIELD_SLUG: &str = "slug";
pub const FIELD_CITY: &str = "city";
pub const FIELD_STATE: &str = "state";

/// Raw place attributes as submitted by a client.
///
/// Only a JSON object is accepted; arrays and scalars are rejected by the
/// deserializer. Unknown keys are ignored. A key that is absent stays
/// `None`; a key sent as `null` becomes `Some(Value::Null)` so update rules
/// can tell the two apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceInput {
    pub name: Option<Value>,
    pub slug: Option<Value>,
    pub city: Option<Value>,
    pub state: Option<Value>,
}

impl<'de> Deserialize<'de> for PlaceInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut body = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            name: body.remove(FIELD_NAME),
            slug: body.remove(FIELD_SLUG),
            city: body.remove(FIELD_CITY),
            state: body.remove(FIELD_STATE),
        })
    }
}

/// A fully validated new place, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlace {
    pub name: String,
    pub slug: String,
    pub city: String,
    pub state: String,
}

/// Validated changes to an existing place. `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePlace {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl UpdatePlace {
    /// True when no attribute would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none() && self.city.is_none() && self.state.is_none()
    }
}

impl PlaceInput {
    /// Validate for creation: all four attributes are required.
    pub fn validate_create(&self) -> Result<CreatePlace, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = check(&mut errors, FIELD_NAME, self.name.as_ref());
        let slug = check(&mut errors, FIELD_SLUG, self.slug.as_ref());
        let city = check(&mut errors, FIELD_CITY, self.city.as_ref());
        let state = check(&mut errors, FIELD_STATE, self.state.as_ref());

        match (name, slug, city, state) {
            (Some(name), Some(slug), Some(city), Some(state)) => Ok(CreatePlace {
                name,
                slug,
                city,
                state,
            }),
            _ => Err(errors),
        }
    }

    /// Validate for update: only attributes present in the input are
    /// checked, but each one present must satisfy the full rule chain.
    pub fn validate_update(&self) -> Result<UpdatePlace, FieldErrors> {
        let mut errors = FieldErrors::new();
        let changes = UpdatePlace {
            name: check_present(&mut errors, FIELD_NAME, self.name.as_ref()),
            slug: check_present(&mut errors, FIELD_SLUG, self.slug.as_ref()),
            city: check_present(&mut errors, FIELD_CITY, self.city.as_ref()),
            state: check_present(&mut errors, FIELD_STATE, self.state.as_ref()),
        };

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }

    /// The submitted slug, if present and otherwise valid.
    ///
    /// Used to run the uniqueness check even when other fields failed, so
    /// every problem is reported in one response.
    pub fn checked_slug(&self) -> Option<String> {
        self.slug
            .as_ref()
            .and_then(|value| text_field(FIELD_SLUG, Some(value)).ok())
    }
}

fn check(errors: &mut FieldErrors, field: &'static str, value: Option<&Value>) -> Option<String> {
    match text_field(field, value) {
        Ok(text) => Some(text),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn check_present(
    errors: &mut FieldErrors,
    field: &'static str,
    value: Option<&Value>,
) -> Option<String> {
    value.and_then(|v| check(errors, field, Some(v)))
}
