use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{impl_tracked, require_non_negative, require_text};
use crate::enums::{EntityKind, MovementType};
use crate::errors::CoreError;

/// Condition given to tools registered without an explicit one.
pub const DEFAULT_TOOL_CONDITION: &str = "Исправен";

/// A stocked material. `name` is the natural key used by bulk import.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub min_stock: f64,
}

impl Material {
    #[must_use]
    pub fn below_min_stock(&self) -> bool {
        self.quantity < self.min_stock
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewMaterial {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub min_stock: f64,
}

impl NewMaterial {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            min_stock: 0.0,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or unit, or negative
    /// quantities.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)?;
        require_text("unit", &self.unit)?;
        require_non_negative("quantity", self.quantity)?;
        require_non_negative("min_stock", self.min_stock)
    }
}

/// A tool kept at a location.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub condition: String,
    pub location: String,
    pub last_check: Option<NaiveDate>,
}

fn default_condition() -> String {
    DEFAULT_TOOL_CONDITION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewTool {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub last_check: Option<NaiveDate>,
}

impl NewTool {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            condition: default_condition(),
            location: String::new(),
            last_check: None,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("name", &self.name)
    }
}

/// A journal entry for a tool moving between locations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ToolMovement {
    pub id: i64,
    pub tool_id: i64,
    pub date: DateTime<Utc>,
    pub from_location: String,
    pub to_location: String,
    pub moved_by: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewToolMovement {
    pub tool_id: i64,
    #[serde(default)]
    pub from_location: String,
    #[serde(default)]
    pub to_location: String,
    #[serde(default)]
    pub moved_by: String,
    #[serde(default)]
    pub note: String,
}

/// A journal entry for material received or consumed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MaterialMovement {
    pub id: i64,
    pub material_id: i64,
    pub date: DateTime<Utc>,
    pub quantity: f64,
    pub movement_type: MovementType,
    pub project: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewMaterialMovement {
    pub material_id: i64,
    pub quantity: f64,
    pub movement_type: MovementType,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub note: String,
}

impl NewMaterialMovement {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a negative quantity.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_non_negative("quantity", self.quantity)
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for ToolMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tool {}: {} -> {}",
            self.tool_id, self.from_location, self.to_location
        )
    }
}

impl fmt::Display for MaterialMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "material {}: {} {}",
            self.material_id, self.movement_type, self.quantity
        )
    }
}

impl_tracked!(Material, EntityKind::Material);
impl_tracked!(Tool, EntityKind::Tool);
impl_tracked!(ToolMovement, EntityKind::ToolMovement);
impl_tracked!(MaterialMovement, EntityKind::MaterialMovement);
