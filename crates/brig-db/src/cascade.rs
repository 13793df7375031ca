//! Delete with explicit reference policies.
//!
//! Before an entity row is removed, every reference to it listed in
//! [`references_to`] is resolved: set-null columns are cleared, cascading
//! rows are collected (recursively, for kinds that are themselves
//! referenced) and deleted. Runs on the caller's transaction.

use std::collections::HashSet;

use brig_core::enums::EntityKind;
use brig_core::references::{OnDelete, references_to};

use crate::error::DatabaseError;
use crate::helpers::in_list;

/// Table holding rows of `kind`.
#[must_use]
pub const fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Role => "roles",
        EntityKind::User => "users",
        EntityKind::WorkTime => "work_times",
        EntityKind::Project => "projects",
        EntityKind::Estimate => "estimates",
        EntityKind::WorkType => "work_types",
        EntityKind::Material => "materials",
        EntityKind::Tool => "tools",
        EntityKind::ToolMovement => "tool_movements",
        EntityKind::MaterialMovement => "material_movements",
        EntityKind::Report => "reports",
        EntityKind::Comment => "comments",
        EntityKind::Notification => "notifications",
        EntityKind::AuditLog => "audit_log",
    }
}

/// Resolve all references to `kind`/`id`, then delete the row.
///
/// Returns the number of entity rows deleted, the root included.
///
/// # Errors
///
/// Returns `DatabaseError` if any statement fails. Must run inside a
/// transaction; foreign key checks are deferred to its commit.
pub async fn delete_with_references(
    conn: &libsql::Connection,
    kind: EntityKind,
    id: i64,
) -> Result<usize, DatabaseError> {
    // Rows cascade across several paths (author and parent for comments),
    // so the final order is not guaranteed parent-after-child.
    conn.execute("PRAGMA defer_foreign_keys = ON", ()).await?;

    let mut seen: HashSet<(EntityKind, i64)> = HashSet::from([(kind, id)]);
    let mut pending = vec![(kind, vec![id])];
    let mut doomed: Vec<(EntityKind, Vec<i64>)> = Vec::new();

    while let Some((kind, ids)) = pending.pop() {
        for reference in references_to(kind) {
            let (placeholders, params) = in_list(&ids, 1);
            match (reference.on_delete, reference.child) {
                (OnDelete::SetNull, _) => {
                    let sql = format!(
                        "UPDATE {table} SET {column} = NULL WHERE {column} IN ({placeholders})",
                        table = reference.table,
                        column = reference.column,
                    );
                    let cleared = conn.execute(&sql, libsql::params_from_iter(params)).await?;
                    if cleared > 0 {
                        tracing::debug!(table = reference.table, column = reference.column, cleared, "reference cleared");
                    }
                }
                (OnDelete::Cascade, None) => {
                    let sql = format!(
                        "DELETE FROM {table} WHERE {column} IN ({placeholders})",
                        table = reference.table,
                        column = reference.column,
                    );
                    conn.execute(&sql, libsql::params_from_iter(params)).await?;
                }
                (OnDelete::Cascade, Some(child)) => {
                    let sql = format!(
                        "SELECT id FROM {table} WHERE {column} IN ({placeholders}) ORDER BY id",
                        table = reference.table,
                        column = reference.column,
                    );
                    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
                    let mut children = Vec::new();
                    while let Some(row) = rows.next().await? {
                        let child_id = row.get::<i64>(0)?;
                        if seen.insert((child, child_id)) {
                            children.push(child_id);
                        }
                    }
                    if !children.is_empty() {
                        pending.push((child, children));
                    }
                }
            }
        }
        doomed.push((kind, ids));
    }

    let mut deleted = 0;
    for (kind, ids) in doomed.into_iter().rev() {
        let (placeholders, params) = in_list(&ids, 1);
        let sql = format!("DELETE FROM {} WHERE id IN ({placeholders})", table_for(kind));
        let removed = conn.execute(&sql, libsql::params_from_iter(params)).await?;
        deleted += usize::try_from(removed).unwrap_or(usize::MAX);
    }
    tracing::debug!(root = %kind, id, deleted, "delete resolved");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::entities::{NewComment, NewEstimate, NewWorkType};
    use brig_core::enums::NotificationLevel;
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{count_rows, seed_actor, seed_project, test_service};

    #[tokio::test]
    async fn project_delete_cascades_estimates_work_types_and_comments() {
        let svc = test_service().await;
        let (worker, actor) = seed_actor(&svc, "worker").await;
        let project = seed_project(&svc, None, "Tower").await;
        let estimate = svc
            .create_estimate(None, NewEstimate::new(project.id, "Frame", 500.0))
            .await
            .unwrap();
        let mut wt = NewWorkType::new(estimate.id, "Welding", 100.0);
        wt.assigned_to = vec![worker.id];
        svc.create_work_type(None, wt).await.unwrap();
        let top = svc
            .create_comment(&actor, NewComment::on_project(project.id, "start"))
            .await
            .unwrap();
        svc.create_comment(&actor, NewComment::reply(top.id, "ok"))
            .await
            .unwrap();

        svc.delete_project(None, project.id).await.unwrap();

        assert_eq!(count_rows(&svc, "estimates").await, 0);
        assert_eq!(count_rows(&svc, "work_types").await, 0);
        assert_eq!(count_rows(&svc, "work_type_assignees").await, 0);
        assert_eq!(count_rows(&svc, "comments").await, 0);
        assert_eq!(count_rows(&svc, "users").await, 1);
    }

    #[tokio::test]
    async fn user_delete_handles_interleaved_threads() {
        let svc = test_service().await;
        let (_, leaving) = seed_actor(&svc, "leaving").await;
        let (_, staying) = seed_actor(&svc, "staying").await;
        let project = seed_project(&svc, None, "Tower").await;

        // leaving -> staying -> leaving
        let a = svc
            .create_comment(&leaving, NewComment::on_project(project.id, "a"))
            .await
            .unwrap();
        let b = svc
            .create_comment(&staying, NewComment::reply(a.id, "b"))
            .await
            .unwrap();
        svc.create_comment(&leaving, NewComment::reply(b.id, "c"))
            .await
            .unwrap();
        svc.create_comment(&staying, NewComment::on_project(project.id, "own"))
            .await
            .unwrap();

        svc.delete_user(Some(&staying), leaving.user_id).await.unwrap();

        assert_eq!(count_rows(&svc, "comments").await, 1);
    }

    #[tokio::test]
    async fn deleting_a_user_keeps_their_audit_trail() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "manager").await;
        seed_project(&svc, Some(&actor), "Tower").await;
        let audit_before = count_rows(&svc, "audit_log").await;

        svc.delete_user(None, actor.user_id).await.unwrap();

        // Entries survive with the actor link cleared; one more for the delete.
        assert_eq!(count_rows(&svc, "audit_log").await, audit_before + 1);
        let mut rows = svc
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM audit_log WHERE actor_id IS NOT NULL",
                (),
            )
            .await
            .unwrap();
        let linked = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(linked, 0);
    }

    #[tokio::test]
    async fn user_delete_clears_their_broadcast_reads() {
        let svc = test_service().await;
        let (leaving, actor) = seed_actor(&svc, "leaving").await;
        let broadcast = svc
            .notify(None, "Склад", "Инвентаризация", NotificationLevel::Info, "")
            .await
            .unwrap();
        svc.notify(Some(leaving.id), "Лично", "m", NotificationLevel::Info, "")
            .await
            .unwrap();
        svc.mark_read(&actor, broadcast.id).await.unwrap();
        assert_eq!(count_rows(&svc, "notification_reads").await, 1);

        svc.delete_user(None, leaving.id).await.unwrap();

        assert_eq!(count_rows(&svc, "notification_reads").await, 0);
        let remaining = svc.list_notifications(None, false).await.unwrap();
        assert!(remaining.iter().any(|n| n.id == broadcast.id));
        let mut rows = svc
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1", [leaving.id])
            .await
            .unwrap();
        let addressed = rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap();
        assert_eq!(addressed, 0);
    }
}
