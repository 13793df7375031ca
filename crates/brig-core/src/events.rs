//! Domain events emitted by entity mutations.
//!
//! A store mutation returns a [`Mutation`]: the written entity plus the
//! events describing what happened. Events are captured synchronously from
//! the entity at mutation time, so a delete event still carries the
//! pre-deletion representation and attributes after the row is gone.
//! Consumers (audit, notifications) never re-read the entity.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit_detail::{self, ImportDetail};
use crate::enums::{AuditAction, EntityKind};

/// A persisted record whose mutations can be audited.
pub trait Tracked: Serialize + fmt::Display {
    /// Declared kind; becomes the audit `object_type`.
    const KIND: EntityKind;

    /// Identifier, if the record has one.
    fn object_id(&self) -> Option<i64>;

    /// Canonical string form captured into `object_repr`.
    fn object_repr(&self) -> String {
        self.to_string()
    }
}

/// Something that happened to one entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DomainEvent {
    pub action: AuditAction,
    pub kind: EntityKind,
    /// Stringified identifier; empty when the entity had none.
    pub object_id: String,
    pub object_repr: String,
    /// Serialized entity as of the event.
    pub snapshot: Value,
    pub changes: Option<Value>,
    pub extra: Option<Value>,
}

impl DomainEvent {
    /// Capture an event with an explicit action.
    #[must_use]
    pub fn new<T: Tracked>(action: AuditAction, entity: &T) -> Self {
        Self {
            action,
            kind: T::KIND,
            object_id: entity
                .object_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            object_repr: entity.object_repr(),
            snapshot: serde_json::to_value(entity).unwrap_or(Value::Null),
            changes: None,
            extra: None,
        }
    }

    #[must_use]
    pub fn created<T: Tracked>(entity: &T) -> Self {
        Self::new(AuditAction::Create, entity)
    }

    /// Update event with a field diff between `before` and `after`.
    /// `changes` is `None` when nothing differs.
    #[must_use]
    pub fn updated<T: Tracked>(before: &T, after: &T) -> Self {
        let mut event = Self::new(AuditAction::Update, after);
        let before = serde_json::to_value(before).unwrap_or(Value::Null);
        let changes = audit_detail::diff(&before, &event.snapshot);
        if !changes.is_empty() {
            event.changes = serde_json::to_value(changes).ok();
        }
        event
    }

    #[must_use]
    pub fn deleted<T: Tracked>(entity: &T) -> Self {
        Self::new(AuditAction::Delete, entity)
    }

    #[must_use]
    pub fn imported<T: Tracked>(entity: &T, detail: &ImportDetail) -> Self {
        let mut event = Self::new(AuditAction::Import, entity);
        event.extra = serde_json::to_value(detail).ok();
        event
    }

    /// Read a string attribute from the snapshot (e.g. `username`).
    #[must_use]
    pub fn attr_str(&self, field: &str) -> Option<&str> {
        self.snapshot.get(field).and_then(Value::as_str)
    }
}

/// The result of a store mutation: the entity and the events it produced.
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub entity: T,
    pub events: Vec<DomainEvent>,
}

impl<T> Mutation<T> {
    #[must_use]
    pub fn new(entity: T, event: DomainEvent) -> Self {
        Self {
            entity,
            events: vec![event],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Serialize)]
    struct Widget {
        id: Option<i64>,
        name: String,
    }

    impl fmt::Display for Widget {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.name)
        }
    }

    impl Tracked for Widget {
        const KIND: EntityKind = EntityKind::Tool;

        fn object_id(&self) -> Option<i64> {
            self.id
        }
    }

    #[test]
    fn created_captures_repr_and_id() {
        let event = DomainEvent::created(&Widget {
            id: Some(42),
            name: "Drill".into(),
        });
        assert_eq!(event.action, AuditAction::Create);
        assert_eq!(event.kind, EntityKind::Tool);
        assert_eq!(event.object_id, "42");
        assert_eq!(event.object_repr, "Drill");
        assert_eq!(event.attr_str("name"), Some("Drill"));
    }

    #[test]
    fn missing_id_stringifies_empty() {
        let event = DomainEvent::deleted(&Widget {
            id: None,
            name: "Saw".into(),
        });
        assert_eq!(event.object_id, "");
    }

    #[test]
    fn updated_records_diff() {
        let before = Widget {
            id: Some(1),
            name: "Drill".into(),
        };
        let after = Widget {
            id: Some(1),
            name: "Hammer drill".into(),
        };
        let event = DomainEvent::updated(&before, &after);
        assert_eq!(event.object_repr, "Hammer drill");
        let changes = event.changes.unwrap();
        assert_eq!(changes["name"]["from"], "Drill");
        assert_eq!(changes["name"]["to"], "Hammer drill");
    }

    #[test]
    fn unchanged_update_has_no_diff() {
        let w = Widget {
            id: Some(1),
            name: "Drill".into(),
        };
        assert!(DomainEvent::updated(&w, &w).changes.is_none());
    }

    #[test]
    fn imported_carries_row_detail() {
        let event = DomainEvent::imported(
            &Widget {
                id: Some(9),
                name: "Cement".into(),
            },
            &ImportDetail {
                row: 2,
                created: false,
            },
        );
        assert_eq!(event.action, AuditAction::Import);
        assert_eq!(event.extra.unwrap()["row"], 2);
    }
}
