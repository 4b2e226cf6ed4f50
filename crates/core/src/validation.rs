//! Field-level validation primitives.
//!
//! [`FieldErrors`] collects human-readable messages per field so a single
//! rejection can report every problem at once. [`text_field`] applies the
//! `required | string | max` rule chain shared by all place attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length, in characters, of any text attribute.
pub const MAX_TEXT_LEN: usize = 255;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub fn required_message(field: &str) -> String {
    format!("The {field} field is required.")
}

pub fn string_message(field: &str) -> String {
    format!("The {field} field must be a string.")
}

pub fn null_byte_message(field: &str) -> String {
    format!("The {field} field must not contain null characters.")
}

pub fn max_message(field: &str) -> String {
    format!("The {field} field must not be greater than {MAX_TEXT_LEN} characters.")
}

pub fn unique_message(field: &str) -> String {
    format!("The {field} has already been taken.")
}

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Validation messages keyed by field name.
///
/// Serializes as a plain JSON object: `{"name": ["The name field is required."]}`.
/// Fields are kept in sorted order so responses are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors containing exactly one message for one field.
    pub fn single(field: &'static str, message: String) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: String) {
        self.0.entry(field).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of individual messages across all fields.
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Names of every field with at least one message, sorted.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.keys().copied().collect()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One-line summary: the first message, plus a count of the rest.
    ///
    /// `The name field is required. (and 2 more errors)`
    pub fn summary(&self) -> String {
        let Some(first) = self.0.values().flatten().next() else {
            return "The given data was invalid.".to_string();
        };
        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{first} (and 1 more error)"),
            n => format!("{first} (and {n} more errors)"),
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Apply the `required | string | max` chain to a submitted JSON value.
///
/// `None` means the key was absent; `Some(Value::Null)` means it was sent
/// as `null`. Both fail `required`, as does a string that is empty after
/// trimming. Text containing U+0000 cannot be stored and is rejected
/// before the length check. On success the trimmed string is returned.
///
/// Only the first failing rule is reported.
pub fn text_field(field: &str, value: Option<&Value>) -> Result<String, String> {
    let text = match value {
        None | Some(Value::Null) => return Err(required_message(field)),
        Some(Value::String(s)) => s.trim(),
        Some(Value::Array(items)) if items.is_empty() => return Err(required_message(field)),
        Some(_) => return Err(string_message(field)),
    };

    if text.is_empty() {
        return Err(required_message(field));
    }
    if text.contains('\0') {
        return Err(null_byte_message(field));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(max_message(field));
    }
    Ok(text.to_string())
}
