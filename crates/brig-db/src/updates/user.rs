//! User update builder.

use brig_core::errors::CoreError;
use serde::{Deserialize, Serialize};

use super::{check_amount, check_text, double_option};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UserUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank or spaced username, a
    /// negative salary, or an over-long phone number.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("username", self.username.as_ref())?;
        if self
            .username
            .as_ref()
            .is_some_and(|u| u.chars().any(char::is_whitespace))
        {
            return Err(CoreError::validation("username must not contain whitespace"));
        }
        if self.phone.as_ref().is_some_and(|p| p.chars().count() > 20) {
            return Err(CoreError::validation("phone must be at most 20 characters"));
        }
        check_amount("salary", self.salary)
    }
}

pub struct UserUpdateBuilder(UserUpdate);

impl UserUpdateBuilder {
    pub fn new() -> Self {
        Self(UserUpdate::default())
    }

    pub fn first_name(mut self, val: impl Into<String>) -> Self {
        self.0.first_name = Some(val.into());
        self
    }

    pub fn last_name(mut self, val: impl Into<String>) -> Self {
        self.0.last_name = Some(val.into());
        self
    }

    pub fn email(mut self, val: impl Into<String>) -> Self {
        self.0.email = Some(val.into());
        self
    }

    pub const fn role_id(mut self, val: Option<i64>) -> Self {
        self.0.role_id = Some(val);
        self
    }

    pub const fn salary(mut self, val: f64) -> Self {
        self.0.salary = Some(val);
        self
    }

    pub fn phone(mut self, val: impl Into<String>) -> Self {
        self.0.phone = Some(val.into());
        self
    }

    pub fn address(mut self, val: impl Into<String>) -> Self {
        self.0.address = Some(val.into());
        self
    }

    pub fn build(self) -> UserUpdate {
        self.0
    }
}
