use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{impl_tracked, require_non_negative, require_text};
use crate::enums::EntityKind;
use crate::errors::CoreError;

/// Status given to projects created without an explicit one.
pub const DEFAULT_PROJECT_STATUS: &str = "В работе";

/// A construction project for a customer.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub customer: String,
    pub budget: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub description: String,
    pub manager_id: Option<i64>,
}

fn default_status() -> String {
    DEFAULT_PROJECT_STATUS.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub customer: String,
    pub budget: f64,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manager_id: Option<i64>,
}

impl NewProject {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        customer: impl Into<String>,
        budget: f64,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            customer: customer.into(),
            budget,
            start_date,
            end_date: None,
            status: default_status(),
            description: String::new(),
            manager_id: None,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank name/customer, a negative
    /// budget, or an end date before the start date.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_text("customer", &self.customer)?;
        require_non_negative("budget", self.budget)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(CoreError::validation("end_date must not precede start_date"));
            }
        }
        Ok(())
    }
}

/// A cost estimate attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Estimate {
    pub id: i64,
    pub project_id: i64,
    /// Name of the owning project, joined in on read.
    pub project_name: String,
    pub name: String,
    pub total: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewEstimate {
    pub project_id: i64,
    pub name: String,
    pub total: f64,
}

impl NewEstimate {
    #[must_use]
    pub fn new(project_id: i64, name: impl Into<String>, total: f64) -> Self {
        Self {
            project_id,
            name: name.into(),
            total,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or negative total.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_non_negative("total", self.total)
    }
}

/// A line of work inside an estimate, optionally assigned to staff.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkType {
    pub id: i64,
    pub estimate_id: i64,
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub assigned_to: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewWorkType {
    pub estimate_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: f64,
    #[serde(default)]
    pub assigned_to: Vec<i64>,
}

impl NewWorkType {
    #[must_use]
    pub fn new(estimate_id: i64, name: impl Into<String>, cost: f64) -> Self {
        Self {
            estimate_id,
            name: name.into(),
            description: String::new(),
            cost,
            assigned_to: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or negative cost.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_non_negative("cost", self.cost)
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.project_name, self.name)
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl_tracked!(Project, EntityKind::Project);
impl_tracked!(Estimate, EntityKind::Estimate);
impl_tracked!(WorkType, EntityKind::WorkType);
