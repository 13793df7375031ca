//! Cross-cutting error types for Brig.
//!
//! Domain-specific errors (`DatabaseError`, `ConfigError`, `ApiError`) live in
//! their own crates. `CoreError` covers failures raised while building or
//! validating core values before they reach storage.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (required fields, ranges, scoping).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
