//! Work type update builder.

use brig_core::errors::CoreError;
use serde::{Deserialize, Serialize};

use super::{check_amount, check_text};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkTypeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Replaces the whole assignee set when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<i64>>,
}

impl WorkTypeUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or negative cost.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("name", self.name.as_ref())?;
        check_amount("cost", self.cost)
    }
}

pub struct WorkTypeUpdateBuilder(WorkTypeUpdate);

impl WorkTypeUpdateBuilder {
    pub fn new() -> Self {
        Self(WorkTypeUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub fn description(mut self, val: impl Into<String>) -> Self {
        self.0.description = Some(val.into());
        self
    }

    pub const fn cost(mut self, val: f64) -> Self {
        self.0.cost = Some(val);
        self
    }

    pub fn assigned_to(mut self, val: Vec<i64>) -> Self {
        self.0.assigned_to = Some(val);
        self
    }

    pub fn build(self) -> WorkTypeUpdate {
        self.0
    }
}
