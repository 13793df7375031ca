use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{impl_tracked, require_text};
use crate::enums::{EntityKind, ReportType};
use crate::errors::CoreError;

/// A generated report. `file` is the storage path of an attached export, if any.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Report {
    pub id: i64,
    pub name: String,
    pub report_type: ReportType,
    pub created_at: DateTime<Utc>,
    pub data: serde_json::Value,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewReport {
    pub name: String,
    pub report_type: ReportType,
    pub data: serde_json::Value,
    #[serde(default)]
    pub file: Option<String>,
}

impl NewReport {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.report_type.label())
    }
}

impl_tracked!(Report, EntityKind::Report);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_type_label() {
        let report = Report {
            id: 3,
            name: "Q1 stock".into(),
            report_type: ReportType::Warehouse,
            created_at: Utc::now(),
            data: serde_json::json!({}),
            file: None,
        };
        assert_eq!(report.to_string(), "Q1 stock (Склад)");
    }
}
