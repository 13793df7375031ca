//! Small JSON envelopes returned by the API besides plain entities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `{"status": "..."}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    #[must_use]
    pub fn read() -> Self {
        Self {
            status: "read".to_string(),
        }
    }
}

/// `{"error": "..."}` body for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Outcome of a bulk natural-key import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

impl ImportSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated
    }
}
