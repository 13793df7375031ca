//! Comment thread limits.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_max_depth() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentsConfig {
    /// Deepest reply level accepted on write and rendered on read.
    /// Top-level comments are depth 0.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl CommentsConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::invalid(
                "comments.max_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
