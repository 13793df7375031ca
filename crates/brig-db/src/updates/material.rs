//! Material update builder.

use brig_core::errors::CoreError;
use serde::{Deserialize, Serialize};

use super::{check_amount, check_text};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<f64>,
}

impl MaterialUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank text or negative amounts.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_text("name", self.name.as_ref())?;
        check_text("unit", self.unit.as_ref())?;
        check_amount("quantity", self.quantity)?;
        check_amount("min_stock", self.min_stock)
    }
}

pub struct MaterialUpdateBuilder(MaterialUpdate);

impl MaterialUpdateBuilder {
    pub fn new() -> Self {
        Self(MaterialUpdate::default())
    }

    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    pub const fn quantity(mut self, val: f64) -> Self {
        self.0.quantity = Some(val);
        self
    }

    pub fn unit(mut self, val: impl Into<String>) -> Self {
        self.0.unit = Some(val.into());
        self
    }

    pub const fn min_stock(mut self, val: f64) -> Self {
        self.0.min_stock = Some(val);
        self
    }

    pub fn build(self) -> MaterialUpdate {
        self.0
    }
}
