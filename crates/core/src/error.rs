use crate::validation::FieldErrors;

/// Domain errors produced by place operations.
///
/// Carries no HTTP concepts; the API layer decides how each variant is
/// surfaced to clients.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An id-addressed operation targeted a record that does not exist.
    ///
    /// `id` is kept as text so unparseable ids report the same way as
    /// ids with no matching row.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed one or more field rules. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] on any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
