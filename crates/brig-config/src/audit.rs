//! Which entity kinds are audited.

use brig_core::enums::EntityKind;
use serde::{Deserialize, Serialize};

fn default_audited_kinds() -> Vec<EntityKind> {
    vec![EntityKind::Project, EntityKind::User, EntityKind::Material]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Kinds whose create/update/delete/import mutations append audit rows.
    /// Estimates, work types, tools, and movements are off unless listed.
    #[serde(default = "default_audited_kinds")]
    pub audited_kinds: Vec<EntityKind>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            audited_kinds: default_audited_kinds(),
        }
    }
}

impl AuditConfig {
    #[must_use]
    pub fn is_audited(&self, kind: EntityKind) -> bool {
        self.audited_kinds.contains(&kind)
    }
}
