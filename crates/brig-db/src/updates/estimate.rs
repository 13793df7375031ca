//! Estimate update builder.

use brig_core::errors::CoreError;
use serde::{Deserialize, Serialize};

use super::{check_amount, check_text};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl EstimateUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or negative total.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("name", self.name.as_ref())?;
        check_amount("total", self.total)
    }
}

pub struct EstimateUpdateBuilder(EstimateUpdate);

impl EstimateUpdateBuilder {
    pub fn new() -> Self {
        Self(EstimateUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub const fn total(mut self, val: f64) -> Self {
        self.0.total = Some(val);
        self
    }

    pub fn build(self) -> EstimateUpdate {
        self.0
    }
}
