use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The authenticated user performing a request.
///
/// Resolved by the HTTP layer from the upstream identity header and passed
/// into every mutation. `None` at call sites means an anonymous caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    /// Primary key of the acting user.
    pub user_id: i64,
    /// Display name (the user's `username`).
    pub username: String,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}
