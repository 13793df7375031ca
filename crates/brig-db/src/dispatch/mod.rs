//! Mutation dispatch: domain events in, persisted side effects out.
//!
//! Handlers are pure policies. They look at one [`DomainEvent`] and decide
//! which side effects it warrants; the [`Dispatcher`] persists those effects
//! on the caller's connection, so they land in the same transaction as the
//! entity write. Handlers run in registration order per event, which puts
//! the audit entry before any notification.

mod audit;
mod personnel;

pub use audit::{AuditPolicy, audit_entry};
pub use personnel::PersonnelNotifier;

use brig_config::AuditConfig;
use brig_core::actor::Actor;
use brig_core::entities::{AuditLog, NewAuditLog, NewNotification, Notification};
use brig_core::events::DomainEvent;

use crate::error::DatabaseError;
use crate::repos::audit::insert_audit;
use crate::repos::notification::insert_notification;

/// A write requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Audit(NewAuditLog),
    Notify(NewNotification),
}

/// A side effect after it was persisted.
#[derive(Debug, Clone)]
pub enum Applied {
    Audit(AuditLog),
    Notification(Notification),
}

/// Decides the side effects of a domain event.
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn handle(&self, event: &DomainEvent, actor: Option<&Actor>) -> Vec<SideEffect>;
}

/// Ordered set of event handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl Dispatcher {
    /// A dispatcher with no handlers; events are dropped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard wiring: audit policy for the configured kinds, then
    /// personnel notifications.
    #[must_use]
    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new()
            .register(AuditPolicy::new(config.audited_kinds.iter().copied()))
            .register(PersonnelNotifier)
    }

    #[must_use]
    pub fn register(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run every handler over every event and persist the resulting effects
    /// on `conn`.
    ///
    /// # Errors
    ///
    /// Returns the first `DatabaseError` raised while persisting an effect.
    /// Effects already written are left to the caller's transaction to undo.
    pub async fn apply(
        &self,
        conn: &libsql::Connection,
        actor: Option<&Actor>,
        events: &[DomainEvent],
    ) -> Result<Vec<Applied>, DatabaseError> {
        let mut applied = Vec::new();
        for event in events {
            for handler in &self.handlers {
                for effect in handler.handle(event, actor) {
                    tracing::debug!(
                        handler = handler.name(),
                        action = %event.action,
                        kind = %event.kind,
                        object_id = %event.object_id,
                        "applying side effect"
                    );
                    applied.push(match effect {
                        SideEffect::Audit(entry) => Applied::Audit(insert_audit(conn, &entry).await?),
                        SideEffect::Notify(notification) => {
                            Applied::Notification(insert_notification(conn, &notification).await?)
                        }
                    });
                }
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::entities::{NewProject, Project};
    use brig_core::enums::{AuditAction, EntityKind};
    use chrono::NaiveDate;

    use crate::test_support::helpers::test_service;

    fn tower() -> Project {
        let new = NewProject::new(
            "Acme Tower",
            "Acme",
            1000.0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        Project {
            id: 7,
            name: new.name,
            customer: new.customer,
            budget: new.budget,
            start_date: new.start_date,
            end_date: None,
            status: new.status,
            description: String::new(),
            manager_id: None,
        }
    }

    #[test]
    fn standard_wiring_orders_audit_first() {
        let dispatcher = Dispatcher::from_config(&AuditConfig::default());
        assert_eq!(dispatcher.handler_names(), vec!["audit", "personnel"]);
    }

    #[tokio::test]
    async fn empty_dispatcher_writes_nothing() {
        let svc = test_service().await;
        let applied = Dispatcher::new()
            .apply(svc.db().conn(), None, &[DomainEvent::created(&tower())])
            .await
            .unwrap();
        assert!(applied.is_empty());
    }

    #[tokio::test]
    async fn audited_event_persists_one_entry() {
        let svc = test_service().await;
        let dispatcher = Dispatcher::new().register(AuditPolicy::new([EntityKind::Project]));
        let applied = dispatcher
            .apply(svc.db().conn(), None, &[DomainEvent::created(&tower())])
            .await
            .unwrap();

        assert_eq!(applied.len(), 1);
        let Applied::Audit(entry) = &applied[0] else {
            panic!("expected audit entry");
        };
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.object_type, "Project");
        assert_eq!(entry.object_id, "7");
        assert_eq!(entry.object_repr, "Acme Tower");
        assert_eq!(entry.actor_id, None);
    }
}
