//! Audit policy: which events become audit entries.

use std::collections::HashSet;

use brig_core::actor::Actor;
use brig_core::entities::NewAuditLog;
use brig_core::enums::EntityKind;
use brig_core::events::DomainEvent;

use super::{EventHandler, SideEffect};

/// Audits every event whose entity kind is in the configured set.
#[derive(Debug, Clone)]
pub struct AuditPolicy {
    kinds: HashSet<EntityKind>,
}

impl AuditPolicy {
    pub fn new(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_audited(&self, kind: EntityKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl EventHandler for AuditPolicy {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn handle(&self, event: &DomainEvent, actor: Option<&Actor>) -> Vec<SideEffect> {
        if self.is_audited(event.kind) {
            vec![SideEffect::Audit(audit_entry(event, actor))]
        } else {
            Vec::new()
        }
    }
}

/// Build the audit row for an event as captured.
#[must_use]
pub fn audit_entry(event: &DomainEvent, actor: Option<&Actor>) -> NewAuditLog {
    NewAuditLog {
        actor_id: actor.map(|a| a.user_id),
        action: event.action,
        object_type: event.kind.type_name().to_string(),
        object_id: event.object_id.clone(),
        object_repr: event.object_repr.clone(),
        changes: event.changes.clone(),
        extra: event.extra.clone(),
    }
}
