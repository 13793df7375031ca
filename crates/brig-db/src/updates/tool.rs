//! Tool update builder.

use brig_core::errors::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_text, double_option};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub last_check: Option<Option<NaiveDate>>,
}

impl ToolUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or condition.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("name", self.name.as_ref())?;
        check_text("condition", self.condition.as_ref())
    }
}

pub struct ToolUpdateBuilder(ToolUpdate);

impl ToolUpdateBuilder {
    pub fn new() -> Self {
        Self(ToolUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub const fn quantity(mut self, val: u32) -> Self {
        self.0.quantity = Some(val);
        self
    }

    pub fn condition(mut self, val: impl Into<String>) -> Self {
        self.0.condition = Some(val.into());
        self
    }

    pub fn location(mut self, val: impl Into<String>) -> Self {
        self.0.location = Some(val.into());
        self
    }

    pub const fn last_check(mut self, val: Option<NaiveDate>) -> Self {
        self.0.last_check = Some(val);
        self
    }

    pub fn build(self) -> ToolUpdate {
        self.0
    }
}
