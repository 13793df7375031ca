//! Audit actions, notification levels, entity kinds, and small domain enums.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// What happened to the audited object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Export,
    Import,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Login => "login",
            Self::Export => "export",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationLevel
// ---------------------------------------------------------------------------

/// Severity shown next to an inbox message.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of persisted record. Used for audit `object_type`, the audited-kinds
/// configuration, and the on-delete reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Role,
    User,
    WorkTime,
    Project,
    Estimate,
    WorkType,
    Material,
    Tool,
    ToolMovement,
    MaterialMovement,
    Report,
    Comment,
    Notification,
    AuditLog,
}

impl EntityKind {
    pub const ALL: [Self; 14] = [
        Self::Role,
        Self::User,
        Self::WorkTime,
        Self::Project,
        Self::Estimate,
        Self::WorkType,
        Self::Material,
        Self::Tool,
        Self::ToolMovement,
        Self::MaterialMovement,
        Self::Report,
        Self::Comment,
        Self::Notification,
        Self::AuditLog,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::User => "user",
            Self::WorkTime => "work_time",
            Self::Project => "project",
            Self::Estimate => "estimate",
            Self::WorkType => "work_type",
            Self::Material => "material",
            Self::Tool => "tool",
            Self::ToolMovement => "tool_movement",
            Self::MaterialMovement => "material_movement",
            Self::Report => "report",
            Self::Comment => "comment",
            Self::Notification => "notification",
            Self::AuditLog => "audit_log",
        }
    }

    /// Declared type name written to `AuditLog.object_type`.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Role => "Role",
            Self::User => "User",
            Self::WorkTime => "WorkTime",
            Self::Project => "Project",
            Self::Estimate => "Estimate",
            Self::WorkType => "WorkType",
            Self::Material => "Material",
            Self::Tool => "Tool",
            Self::ToolMovement => "ToolMovement",
            Self::MaterialMovement => "MaterialMovement",
            Self::Report => "Report",
            Self::Comment => "Comment",
            Self::Notification => "Notification",
            Self::AuditLog => "AuditLog",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReportType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Project,
    Employee,
    Warehouse,
    Custom,
}

impl ReportType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Employee => "employee",
            Self::Warehouse => "warehouse",
            Self::Custom => "custom",
        }
    }

    /// Human-readable label used in the report's string form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Project => "Проект",
            Self::Employee => "Сотрудник",
            Self::Warehouse => "Склад",
            Self::Custom => "Произвольный",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MovementType
// ---------------------------------------------------------------------------

/// Direction of a material movement: stock received or stock consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Income,
    Expense,
}

impl MovementType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected:literal) => {
            #[test]
            fn $name() {
                let val: $ty = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
                assert_eq!(val.as_str(), $expected);
            }
        };
    }

    test_serde_roundtrip!(audit_import, AuditAction, AuditAction::Import, "import");
    test_serde_roundtrip!(
        level_success,
        NotificationLevel,
        NotificationLevel::Success,
        "success"
    );
    test_serde_roundtrip!(kind_work_type, EntityKind, EntityKind::WorkType, "work_type");
    test_serde_roundtrip!(
        kind_material_movement,
        EntityKind,
        EntityKind::MaterialMovement,
        "material_movement"
    );
    test_serde_roundtrip!(movement_expense, MovementType, MovementType::Expense, "expense");

    #[test]
    fn notification_level_defaults_to_info() {
        assert_eq!(NotificationLevel::default(), NotificationLevel::Info);
    }

    #[test]
    fn type_names_are_pascal_case() {
        assert_eq!(EntityKind::User.type_name(), "User");
        assert_eq!(EntityKind::WorkType.type_name(), "WorkType");
        for kind in EntityKind::ALL {
            let name = kind.type_name();
            assert!(name.chars().next().unwrap().is_ascii_uppercase(), "{name}");
            assert!(!name.contains('_'), "{name}");
        }
    }

    #[test]
    fn all_kinds_are_distinct() {
        let names: std::collections::HashSet<_> =
            EntityKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names.len(), EntityKind::ALL.len());
    }

    #[test]
    fn report_labels() {
        assert_eq!(ReportType::Warehouse.label(), "Склад");
        assert_eq!(ReportType::Custom.label(), "Произвольный");
    }
}
