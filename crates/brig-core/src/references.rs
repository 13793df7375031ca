//! Explicit on-delete policies for references between entity kinds.
//!
//! Deleting a record first resolves every reference pointing at it, in the
//! order listed here, instead of relying on storage-level cascades.

use crate::enums::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Null out the referencing column; the referencing row survives.
    SetNull,
    /// Delete the referencing rows (and, recursively, whatever references them).
    Cascade,
}

/// A column in `table` that points at a record of some kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
    /// Kind of the referencing rows, for cascades that must recurse.
    /// `None` for association tables whose rows nothing else references.
    pub child: Option<EntityKind>,
}

const fn set_null(table: &'static str, column: &'static str) -> Reference {
    Reference {
        table,
        column,
        on_delete: OnDelete::SetNull,
        child: None,
    }
}

const fn cascade(table: &'static str, column: &'static str, child: Option<EntityKind>) -> Reference {
    Reference {
        table,
        column,
        on_delete: OnDelete::Cascade,
        child,
    }
}

const ROLE_REFS: &[Reference] = &[set_null("users", "role_id")];

const USER_REFS: &[Reference] = &[
    set_null("audit_log", "actor_id"),
    cascade("notifications", "recipient_id", Some(EntityKind::Notification)),
    cascade("notification_reads", "user_id", None),
    cascade("work_times", "user_id", Some(EntityKind::WorkTime)),
    set_null("projects", "manager_id"),
    cascade("work_type_assignees", "user_id", None),
    cascade("comments", "author_id", Some(EntityKind::Comment)),
];

const PROJECT_REFS: &[Reference] = &[
    cascade("estimates", "project_id", Some(EntityKind::Estimate)),
    cascade("comments", "project_id", Some(EntityKind::Comment)),
];

const ESTIMATE_REFS: &[Reference] = &[cascade("work_types", "estimate_id", Some(EntityKind::WorkType))];

const WORK_TYPE_REFS: &[Reference] = &[cascade("work_type_assignees", "work_type_id", None)];

const MATERIAL_REFS: &[Reference] = &[
    cascade("material_movements", "material_id", None),
    cascade("comments", "material_id", Some(EntityKind::Comment)),
];

const TOOL_REFS: &[Reference] = &[cascade("tool_movements", "tool_id", None)];

const NOTIFICATION_REFS: &[Reference] = &[cascade("notification_reads", "notification_id", None)];

const COMMENT_REFS: &[Reference] = &[cascade("comments", "parent_id", Some(EntityKind::Comment))];

/// Every reference that points at records of `kind`.
#[must_use]
pub const fn references_to(kind: EntityKind) -> &'static [Reference] {
    match kind {
        EntityKind::Role => ROLE_REFS,
        EntityKind::User => USER_REFS,
        EntityKind::Project => PROJECT_REFS,
        EntityKind::Estimate => ESTIMATE_REFS,
        EntityKind::WorkType => WORK_TYPE_REFS,
        EntityKind::Material => MATERIAL_REFS,
        EntityKind::Tool => TOOL_REFS,
        EntityKind::Comment => COMMENT_REFS,
        EntityKind::Notification => NOTIFICATION_REFS,
        EntityKind::WorkTime
        | EntityKind::ToolMovement
        | EntityKind::MaterialMovement
        | EntityKind::Report
        | EntityKind::AuditLog => &[],
    }
}
