//! End-to-end behavior of the mutation pipeline through the public API.

use brig_config::BrigConfig;
use brig_core::actor::Actor;
use brig_core::entities::{NewComment, NewNotification, NewProject, NewUser};
use brig_core::enums::{AuditAction, EntityKind, NotificationLevel};
use brig_core::events::DomainEvent;
use brig_db::BrigDb;
use brig_db::dispatch::{Dispatcher, EventHandler, SideEffect};
use brig_db::repos::audit::AuditFilter;
use brig_db::repos::comment::CommentFilter;
use brig_db::service::BrigService;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn service() -> BrigService {
    let db = BrigDb::open_local(":memory:").await.unwrap();
    BrigService::from_db(db, &BrigConfig::default())
}

async fn actor(svc: &BrigService, username: &str) -> Actor {
    let user = svc.create_user(None, NewUser::new(username)).await.unwrap();
    svc.resolve_actor(user.id).await.unwrap()
}

fn project(name: &str) -> NewProject {
    NewProject::new(
        name,
        "Acme",
        2_500_000.0,
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    )
}

fn audits(action: AuditAction, object_type: &str) -> AuditFilter {
    AuditFilter {
        action: Some(action),
        object_type: Some(object_type.to_string()),
        ..AuditFilter::default()
    }
}

#[tokio::test]
async fn creation_appends_one_audit_with_the_entity_repr() {
    let svc = service().await;
    let admin = actor(&svc, "admin").await;
    let created = svc
        .create_project(Some(&admin), project("Acme Tower"))
        .await
        .unwrap();

    let entries = svc
        .query_audit(&audits(AuditAction::Create, "Project"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].object_repr, created.to_string());
    assert_eq!(entries[0].object_id, created.id.to_string());
    assert_eq!(entries[0].actor.as_deref(), Some("admin"));
}

#[tokio::test]
async fn deletion_keeps_the_pre_deletion_repr() {
    let svc = service().await;
    let created = svc.create_project(None, project("Acme Tower")).await.unwrap();
    svc.delete_project(None, created.id).await.unwrap();

    let entries = svc
        .query_audit(&audits(AuditAction::Delete, "Project"))
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].object_repr, "Acme Tower");
    assert!(svc.get_project(created.id).await.is_err());
}

#[tokio::test]
async fn new_personnel_are_audited_and_announced_to_the_actor() {
    let svc = service().await;
    let admin = actor(&svc, "admin").await;
    svc.create_user(Some(&admin), NewUser::new("jdoe"))
        .await
        .unwrap();

    let created = svc
        .query_audit(&audits(AuditAction::Create, "User"))
        .await
        .unwrap();
    assert_eq!(created[0].object_repr, "jdoe");

    let inbox: Vec<_> = svc
        .list_notifications(Some(&admin), false)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.recipient_id == Some(admin.user_id))
        .collect();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].title, "Добавлен сотрудник");
    assert_eq!(inbox[0].level, NotificationLevel::Success);
    assert!(!inbox[0].read);
}

#[tokio::test]
async fn removing_personnel_names_them_in_the_warning() {
    let svc = service().await;
    let admin = actor(&svc, "admin").await;
    let user = svc.create_user(None, NewUser::new("jdoe")).await.unwrap();
    svc.delete_user(Some(&admin), user.id).await.unwrap();

    let inbox = svc.list_notifications(Some(&admin), false).await.unwrap();
    assert_eq!(inbox[0].title, "Удалён сотрудник");
    assert!(inbox[0].message.contains("jdoe"));
    assert_eq!(inbox[0].level, NotificationLevel::Warning);
}

#[tokio::test]
async fn mark_read_twice_is_a_no_op() {
    let svc = service().await;
    let admin = actor(&svc, "admin").await;
    let note = svc
        .notify(Some(admin.user_id), "Склад", "Проверка", NotificationLevel::Info, "")
        .await
        .unwrap();

    let before = svc.list_notifications(Some(&admin), false).await.unwrap().len();
    let first = svc.mark_read(&admin, note.id).await.unwrap();
    let second = svc.mark_read(&admin, note.id).await.unwrap();
    assert!(first.read);
    assert_eq!(first, second);
    assert_eq!(svc.list_notifications(Some(&admin), false).await.unwrap().len(), before);
}

#[tokio::test]
async fn replies_nest_under_their_parents_in_insertion_order() {
    let svc = service().await;
    let author = actor(&svc, "foreman").await;
    let site = svc.create_project(None, project("Site")).await.unwrap();

    let a = svc
        .create_comment(&author, NewComment::on_project(site.id, "A"))
        .await
        .unwrap();
    let b = svc
        .create_comment(&author, NewComment::reply(a.id, "B"))
        .await
        .unwrap();
    svc.create_comment(&author, NewComment::reply(a.id, "C"))
        .await
        .unwrap();
    svc.create_comment(&author, NewComment::reply(b.id, "D"))
        .await
        .unwrap();

    let threads = svc
        .list_comment_threads(CommentFilter::default())
        .await
        .unwrap();
    assert_eq!(threads.len(), 1);
    let top = &threads[0];
    assert_eq!(top.content, "A");
    let contents: Vec<_> = top.replies.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(contents, vec!["B", "C"]);
    assert_eq!(top.replies[0].replies.len(), 1);
    assert_eq!(top.replies[0].replies[0].content, "D");
    assert!(top.replies[1].replies.is_empty());
}

#[tokio::test]
async fn project_filter_returns_only_that_projects_threads() {
    let svc = service().await;
    let author = actor(&svc, "foreman").await;
    let first = svc.create_project(None, project("First")).await.unwrap();
    let second = svc.create_project(None, project("Second")).await.unwrap();
    svc.create_comment(&author, NewComment::on_project(first.id, "one"))
        .await
        .unwrap();
    let top = svc
        .create_comment(&author, NewComment::on_project(second.id, "two"))
        .await
        .unwrap();
    let reply = svc
        .create_comment(&author, NewComment::reply(top.id, "two, answered"))
        .await
        .unwrap();

    let threads = svc
        .list_comment_threads(CommentFilter {
            project_id: Some(second.id),
            ..CommentFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(threads.len(), 1);
    assert!(threads.iter().all(|t| t.parent_id.is_none()));
    assert_eq!(threads[0].id, top.id);
    assert_eq!(threads[0].project_id, Some(second.id));
    let replies: Vec<i64> = threads[0].replies.iter().map(|r| r.id).collect();
    assert_eq!(replies, vec![reply.id]);
}

#[tokio::test]
async fn importing_duplicate_names_keeps_the_last_quantity() {
    let svc = service().await;
    let rows: Vec<_> = [json!({"name": "Cement", "quantity": 10}), json!({"name": "Cement", "quantity": 5})]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
    svc.import_materials(None, &rows).await.unwrap();

    let materials = svc.list_materials().await.unwrap();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].name, "Cement");
    assert_eq!(materials[0].quantity, 5.0);
}

/// Asks for a notification to a user that does not exist.
struct Misaddressed;

impl EventHandler for Misaddressed {
    fn name(&self) -> &'static str {
        "misaddressed"
    }

    fn handle(&self, event: &DomainEvent, _actor: Option<&Actor>) -> Vec<SideEffect> {
        if event.kind != EntityKind::Project {
            return Vec::new();
        }
        vec![SideEffect::Notify(NewNotification::new(
            Some(999_999),
            "lost",
            "nobody reads this",
        ))]
    }
}

#[tokio::test]
async fn failed_side_effect_rolls_back_the_entity_and_its_audit() {
    let config = BrigConfig::default();
    let db = BrigDb::open_local(":memory:").await.unwrap();
    let svc = BrigService::from_db(db, &config).with_dispatcher(
        Dispatcher::from_config(&config.audit).register(Misaddressed),
    );

    assert!(svc.create_project(None, project("Ghost")).await.is_err());
    assert!(svc.list_projects().await.unwrap().is_empty());
    assert!(
        svc.query_audit(&AuditFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}
