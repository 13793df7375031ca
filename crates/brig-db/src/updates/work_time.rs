//! Timesheet entry update builder.

use brig_core::entities::require_work_hours;
use brig_core::errors::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkTimeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkTimeUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for hours out of range.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.hours.map_or(Ok(()), require_work_hours)
    }
}

pub struct WorkTimeUpdateBuilder(WorkTimeUpdate);

impl WorkTimeUpdateBuilder {
    pub fn new() -> Self {
        Self(WorkTimeUpdate::default())
    }

    pub const fn user_id(mut self, val: i64) -> Self {
        self.0.user_id = Some(val);
        self
    }

    pub const fn date(mut self, val: NaiveDate) -> Self {
        self.0.date = Some(val);
        self
    }

    pub const fn hours(mut self, val: f64) -> Self {
        self.0.hours = Some(val);
        self
    }

    pub fn project(mut self, val: impl Into<String>) -> Self {
        self.0.project = Some(val.into());
        self
    }

    pub fn description(mut self, val: impl Into<String>) -> Self {
        self.0.description = Some(val.into());
        self
    }

    pub fn build(self) -> WorkTimeUpdate {
        self.0
    }
}
