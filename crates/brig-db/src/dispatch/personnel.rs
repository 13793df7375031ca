//! Personnel notifications: staff added or removed.

use brig_core::actor::Actor;
use brig_core::entities::NewNotification;
use brig_core::enums::{AuditAction, EntityKind, NotificationLevel};
use brig_core::events::DomainEvent;

use super::{EventHandler, SideEffect};

/// Notifies the acting user when a user record is created or deleted.
///
/// Messages are built from the event snapshot, so a deletion still names
/// the user whose row is about to go. Anonymous actors produce broadcast
/// notifications (no recipient).
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonnelNotifier;

impl EventHandler for PersonnelNotifier {
    fn name(&self) -> &'static str {
        "personnel"
    }

    fn handle(&self, event: &DomainEvent, actor: Option<&Actor>) -> Vec<SideEffect> {
        if event.kind != EntityKind::User {
            return Vec::new();
        }
        let username = event.attr_str("username").unwrap_or(&event.object_repr);
        let recipient = actor.map(|a| a.user_id);

        let notification = match event.action {
            AuditAction::Create => NewNotification::new(
                recipient,
                "Добавлен сотрудник",
                format!("Сотрудник {username} добавлен в систему."),
            )
            .with_level(NotificationLevel::Success)
            .with_link(format!("/users/{}", event.object_id)),
            AuditAction::Delete => NewNotification::new(
                recipient,
                "Удалён сотрудник",
                format!("Сотрудник {username} удалён из системы."),
            )
            .with_level(NotificationLevel::Warning),
            _ => return Vec::new(),
        };
        vec![SideEffect::Notify(notification)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::entities::User;
    use chrono::Utc;

    fn jdoe() -> User {
        User {
            id: 12,
            username: "jdoe".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role_id: None,
            salary: 0.0,
            phone: String::new(),
            address: String::new(),
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn created_user_notifies_actor() {
        let actor = Actor::new(1, "admin");
        let effects = PersonnelNotifier.handle(&DomainEvent::created(&jdoe()), Some(&actor));
        let [SideEffect::Notify(n)] = effects.as_slice() else {
            panic!("expected one notification");
        };
        assert_eq!(n.recipient_id, Some(1));
        assert_eq!(n.title, "Добавлен сотрудник");
        assert_eq!(n.level, NotificationLevel::Success);
        assert!(n.message.contains("jdoe"));
        assert_eq!(n.link, "/users/12");
    }

    #[test]
    fn deleted_user_message_names_the_user() {
        let effects = PersonnelNotifier.handle(&DomainEvent::deleted(&jdoe()), None);
        let [SideEffect::Notify(n)] = effects.as_slice() else {
            panic!("expected one notification");
        };
        assert_eq!(n.recipient_id, None);
        assert_eq!(n.level, NotificationLevel::Warning);
        assert!(n.message.contains("jdoe"));
    }

    #[test]
    fn updates_and_other_kinds_are_silent() {
        let user = jdoe();
        assert!(PersonnelNotifier
            .handle(&DomainEvent::updated(&user, &user), None)
            .is_empty());
    }
}
