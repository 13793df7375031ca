use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::impl_tracked;
use crate::enums::{AuditAction, EntityKind};

/// An immutable audit event: who did what to which object, and when.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLog {
    pub id: i64,
    /// `None` for anonymous actions or once the acting user has been deleted.
    pub actor_id: Option<i64>,
    /// Display name of the actor at read time.
    pub actor: Option<String>,
    pub action: AuditAction,
    pub object_type: String,
    pub object_id: String,
    pub object_repr: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Option<serde_json::Value>,
    pub extra: Option<serde_json::Value>,
}

/// Row to append. `timestamp` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAuditLog {
    pub actor_id: Option<i64>,
    pub action: AuditAction,
    pub object_type: String,
    pub object_id: String,
    pub object_repr: String,
    pub changes: Option<serde_json::Value>,
    pub extra: Option<serde_json::Value>,
}

impl fmt::Display for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action, self.object_type, self.object_id)
    }
}

impl_tracked!(AuditLog, EntityKind::AuditLog);
