//! Entity structs for all Brig domain records.
//!
//! Each entity maps to a table in the libSQL database. Persisted entities
//! derive `Serialize`, `Deserialize`, and `JsonSchema`; the matching `New*`
//! structs are the create payloads accepted by the store and the HTTP API.

mod audit;
mod comment;
mod notification;
mod project;
mod report;
mod user;
mod warehouse;

pub use audit::{AuditLog, NewAuditLog};
pub use comment::{Comment, CommentNode, NewComment};
pub use notification::{NewNotification, Notification};
pub use project::{Estimate, NewEstimate, NewProject, NewWorkType, Project, WorkType};
pub use report::{NewReport, Report};
pub use user::{MAX_WORK_HOURS, NewRole, NewUser, NewWorkTime, Role, User, WorkTime, require_work_hours};
pub use warehouse::{
    Material, MaterialMovement, NewMaterial, NewMaterialMovement, NewTool, NewToolMovement, Tool,
    ToolMovement,
};

/// Implement [`crate::events::Tracked`] for a persisted entity with an `id: i64` field.
macro_rules! impl_tracked {
    ($ty:ty, $kind:expr) => {
        impl $crate::events::Tracked for $ty {
            const KIND: $crate::enums::EntityKind = $kind;

            fn object_id(&self) -> Option<i64> {
                Some(self.id)
            }
        }
    };
}

pub(crate) use impl_tracked;

/// Reject blank required text fields.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), crate::errors::CoreError> {
    if value.trim().is_empty() {
        return Err(crate::errors::CoreError::validation(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

/// Reject negative amounts (money, stock).
pub(crate) fn require_non_negative(
    field: &str,
    value: f64,
) -> Result<(), crate::errors::CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(crate::errors::CoreError::validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
