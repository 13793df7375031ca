//! Project update builder.

use brig_core::errors::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_amount, check_text, double_option};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<Option<i64>>,
}

impl ProjectUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank names or a negative budget.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("name", self.name.as_ref())?;
        check_text("customer", self.customer.as_ref())?;
        check_text("status", self.status.as_ref())?;
        check_amount("budget", self.budget)
    }
}

pub struct ProjectUpdateBuilder(ProjectUpdate);

impl ProjectUpdateBuilder {
    pub fn new() -> Self {
        Self(ProjectUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub fn customer(mut self, val: impl Into<String>) -> Self {
        self.0.customer = Some(val.into());
        self
    }

    pub const fn budget(mut self, val: f64) -> Self {
        self.0.budget = Some(val);
        self
    }

    pub const fn start_date(mut self, val: NaiveDate) -> Self {
        self.0.start_date = Some(val);
        self
    }

    pub const fn end_date(mut self, val: Option<NaiveDate>) -> Self {
        self.0.end_date = Some(val);
        self
    }

    pub fn status(mut self, val: impl Into<String>) -> Self {
        self.0.status = Some(val.into());
        self
    }

    pub fn description(mut self, val: impl Into<String>) -> Self {
        self.0.description = Some(val.into());
        self
    }

    pub const fn manager_id(mut self, val: Option<i64>) -> Self {
        self.0.manager_id = Some(val);
        self
    }

    pub fn build(self) -> ProjectUpdate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_clears_absent_keeps() {
        let update: ProjectUpdate =
            serde_json::from_str(r#"{"end_date": null, "status": "Завершён"}"#).unwrap();
        assert_eq!(update.end_date, Some(None));
        assert_eq!(update.manager_id, None);
        assert_eq!(update.status.as_deref(), Some("Завершён"));
    }

    #[test]
    fn blank_name_rejected() {
        let update = ProjectUpdateBuilder::new().name("  ").build();
        assert!(update.validate().is_err());
    }
}
