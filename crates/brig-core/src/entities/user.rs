use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{impl_tracked, require_non_negative, require_text};
use crate::enums::EntityKind;
use crate::errors::CoreError;

/// A named staff role (foreman, accountant, ...).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewRole {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)
    }
}

/// A member of staff. `username` is the natural key used by bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: Option<i64>,
    pub salary: f64,
    pub phone: String,
    pub address: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// First and last name, falling back to the username when both are blank.
    #[must_use]
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub salary: f64,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl NewUser {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank username, a username with
    /// whitespace, a negative salary, or a phone longer than 20 characters.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("username", &self.username)?;
        if self.username.chars().any(char::is_whitespace) {
            return Err(CoreError::validation("username must not contain whitespace"));
        }
        require_non_negative("salary", self.salary)?;
        if self.phone.chars().count() > 20 {
            return Err(CoreError::validation("phone must be at most 20 characters"));
        }
        Ok(())
    }
}

/// Upper bound on a single timesheet entry (five digits, two decimals).
pub const MAX_WORK_HOURS: f64 = 999.99;

/// Hours a member of staff logged on one day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WorkTime {
    pub id: i64,
    pub user_id: i64,
    /// Username of `user_id`, joined in on read.
    pub username: String,
    pub date: NaiveDate,
    pub hours: f64,
    /// Free-text project label; not a reference to `projects`.
    pub project: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewWorkTime {
    pub user_id: i64,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub description: String,
}

impl NewWorkTime {
    #[must_use]
    pub const fn new(user_id: i64, date: NaiveDate, hours: f64) -> Self {
        Self {
            user_id,
            date,
            hours,
            project: String::new(),
            description: String::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for negative hours or more than
    /// [`MAX_WORK_HOURS`].
    pub fn validate(&self) -> Result<(), CoreError> {
        require_work_hours(self.hours)
    }
}

/// Hours must be non-negative and fit the timesheet column.
///
/// # Errors
///
/// Returns `CoreError::Validation` when out of range.
pub fn require_work_hours(hours: f64) -> Result<(), CoreError> {
    require_non_negative("hours", hours)?;
    if hours > MAX_WORK_HOURS {
        return Err(CoreError::validation(format!(
            "hours must be at most {MAX_WORK_HOURS}, got {hours}"
        )));
    }
    Ok(())
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

impl fmt::Display for WorkTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} - {:.2} ч.", self.username, self.date, self.hours)
    }
}

impl_tracked!(Role, EntityKind::Role);
impl_tracked!(User, EntityKind::User);
impl_tracked!(WorkTime, EntityKind::WorkTime);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn username_is_required() {
        assert!(NewUser::new("  ").validate().is_err());
        assert!(NewUser::new("jdoe").validate().is_ok());
    }

    #[test]
    fn username_rejects_whitespace() {
        assert!(NewUser::new("j doe").validate().is_err());
    }

    #[test]
    fn negative_salary_rejected() {
        let user = NewUser {
            salary: -1.0,
            ..NewUser::new("jdoe")
        };
        assert!(matches!(user.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn full_name_falls_back_to_username() {
        let user = User {
            id: 1,
            username: "jdoe".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role_id: None,
            salary: 0.0,
            phone: String::new(),
            address: String::new(),
            date_joined: Utc::now(),
        };
        assert_eq!(user.full_name(), "jdoe");
        assert_eq!(user.to_string(), "jdoe");
    }

    #[rstest]
    #[case(8.0, "jdoe - 2024-03-01 - 8.00 ч.")]
    #[case(7.5, "jdoe - 2024-03-01 - 7.50 ч.")]
    #[case(0.25, "jdoe - 2024-03-01 - 0.25 ч.")]
    fn work_time_repr_shows_two_decimal_hours(#[case] hours: f64, #[case] expected: &str) {
        let entry = WorkTime {
            id: 1,
            user_id: 1,
            username: "jdoe".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            hours,
            project: String::new(),
            description: String::new(),
        };
        assert_eq!(entry.to_string(), expected);
    }

    #[rstest]
    #[case(-1.0, false)]
    #[case(0.0, true)]
    #[case(999.99, true)]
    #[case(1000.0, false)]
    #[case(f64::NAN, false)]
    fn work_hours_range(#[case] hours: f64, #[case] valid: bool) {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(NewWorkTime::new(1, date, hours).validate().is_ok(), valid);
    }
}
