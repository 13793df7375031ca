//! Estimate and work type repository.
//!
//! Work type assignees live in `work_type_assignees`; the set is loaded with
//! the work type and replaced wholesale on update.

use brig_core::actor::Actor;
use brig_core::entities::{Estimate, NewEstimate, NewWorkType, WorkType};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, now_timestamp, parse_datetime};
use crate::repos::ensure_exists;
use crate::service::{BrigService, settle};
use crate::updates::estimate::EstimateUpdate;
use crate::updates::work_type::WorkTypeUpdate;

const ESTIMATE_COLUMNS: &str = "e.id, e.project_id, p.name, e.name, e.total, e.created_at \
     FROM estimates e JOIN projects p ON p.id = e.project_id";
const WORK_TYPE_COLUMNS: &str = "id, estimate_id, name, description, cost FROM work_types";

fn row_to_estimate(row: &libsql::Row) -> Result<Estimate, DatabaseError> {
    Ok(Estimate {
        id: row.get::<i64>(0)?,
        project_id: row.get::<i64>(1)?,
        project_name: row.get::<String>(2)?,
        name: row.get::<String>(3)?,
        total: row.get::<f64>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_work_type(row: &libsql::Row) -> Result<WorkType, DatabaseError> {
    Ok(WorkType {
        id: row.get::<i64>(0)?,
        estimate_id: row.get::<i64>(1)?,
        name: row.get::<String>(2)?,
        description: row.get::<String>(3)?,
        cost: row.get::<f64>(4)?,
        assigned_to: Vec::new(),
    })
}

async fn fetch_estimate(conn: &libsql::Connection, id: i64) -> Result<Estimate, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {ESTIMATE_COLUMNS} WHERE e.id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Estimate, id))?;
    row_to_estimate(&row)
}

async fn load_assignees(conn: &libsql::Connection, work_type_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT user_id FROM work_type_assignees WHERE work_type_id = ?1 ORDER BY user_id",
            [work_type_id],
        )
        .await?;
    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(row.get::<i64>(0)?);
    }
    Ok(users)
}

async fn replace_assignees(
    conn: &libsql::Connection,
    work_type_id: i64,
    users: &[i64],
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM work_type_assignees WHERE work_type_id = ?1",
        [work_type_id],
    )
    .await?;
    for &user_id in users {
        ensure_exists(conn, EntityKind::User, user_id, "assigned_to").await?;
        conn.execute(
            "INSERT OR IGNORE INTO work_type_assignees (work_type_id, user_id) VALUES (?1, ?2)",
            [work_type_id, user_id],
        )
        .await?;
    }
    Ok(())
}

async fn fetch_work_type(conn: &libsql::Connection, id: i64) -> Result<WorkType, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {WORK_TYPE_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::WorkType, id))?;
    let mut work_type = row_to_work_type(&row)?;
    work_type.assigned_to = load_assignees(conn, id).await?;
    Ok(work_type)
}

impl BrigService {
    // -----------------------------------------------------------------------
    // Estimates
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input or an unknown project.
    pub async fn create_estimate(
        &self,
        actor: Option<&Actor>,
        new: NewEstimate,
    ) -> Result<Estimate, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Estimate, DatabaseError> = async {
            ensure_exists(&tx, EntityKind::Project, new.project_id, "project_id").await?;
            tx.execute(
                "INSERT INTO estimates (project_id, name, total, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![new.project_id, new.name.as_str(), new.total, now_timestamp()],
            )
            .await?;
            let estimate = fetch_estimate(&tx, tx.last_insert_rowid()).await?;
            let event = DomainEvent::created(&estimate);
            self.commit_mutation(&tx, actor, Mutation::new(estimate, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no estimate has this id.
    pub async fn get_estimate(&self, id: i64) -> Result<Estimate, DatabaseError> {
        fetch_estimate(self.db().conn(), id).await
    }

    /// Estimates, optionally for one project.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_estimates(&self, project_id: Option<i64>) -> Result<Vec<Estimate>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match project_id {
            Some(project_id) => {
                conn.query(
                    &format!("SELECT {ESTIMATE_COLUMNS} WHERE e.project_id = ?1 ORDER BY e.id"),
                    [project_id],
                )
                .await?
            }
            None => {
                conn.query(&format!("SELECT {ESTIMATE_COLUMNS} ORDER BY e.id"), ())
                    .await?
            }
        };
        let mut estimates = Vec::new();
        while let Some(row) = rows.next().await? {
            estimates.push(row_to_estimate(&row)?);
        }
        Ok(estimates)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn update_estimate(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: EstimateUpdate,
    ) -> Result<Estimate, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<Estimate, DatabaseError> = async {
            let before = fetch_estimate(&tx, id).await?;
            let mut set = SetClause::new();
            if let Some(ref name) = update.name {
                set.set("name", name.as_str());
            }
            if let Some(total) = update.total {
                set.set("total", total);
            }
            if set.is_empty() {
                return Ok(before);
            }
            set.execute(&tx, "estimates", id).await?;
            let after = fetch_estimate(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Delete an estimate with its work types.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no estimate has this id.
    pub async fn delete_estimate(
        &self,
        actor: Option<&Actor>,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let estimate = fetch_estimate(&tx, id).await?;
            self.delete_tracked(&tx, actor, &estimate).await
        }
        .await;
        settle(tx, result).await
    }

    // -----------------------------------------------------------------------
    // Work types
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input, an unknown
    /// estimate, or an unknown assignee.
    pub async fn create_work_type(
        &self,
        actor: Option<&Actor>,
        new: NewWorkType,
    ) -> Result<WorkType, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<WorkType, DatabaseError> = async {
            ensure_exists(&tx, EntityKind::Estimate, new.estimate_id, "estimate_id").await?;
            tx.execute(
                "INSERT INTO work_types (estimate_id, name, description, cost) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    new.estimate_id,
                    new.name.as_str(),
                    new.description.as_str(),
                    new.cost
                ],
            )
            .await?;
            let id = tx.last_insert_rowid();
            replace_assignees(&tx, id, &new.assigned_to).await?;
            let work_type = fetch_work_type(&tx, id).await?;
            let event = DomainEvent::created(&work_type);
            self.commit_mutation(&tx, actor, Mutation::new(work_type, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no work type has this id.
    pub async fn get_work_type(&self, id: i64) -> Result<WorkType, DatabaseError> {
        fetch_work_type(self.db().conn(), id).await
    }

    /// Work types, optionally for one estimate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_work_types(
        &self,
        estimate_id: Option<i64>,
    ) -> Result<Vec<WorkType>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match estimate_id {
            Some(estimate_id) => {
                conn.query(
                    &format!("SELECT {WORK_TYPE_COLUMNS} WHERE estimate_id = ?1 ORDER BY id"),
                    [estimate_id],
                )
                .await?
            }
            None => {
                conn.query(&format!("SELECT {WORK_TYPE_COLUMNS} ORDER BY id"), ())
                    .await?
            }
        };
        let mut work_types = Vec::new();
        while let Some(row) = rows.next().await? {
            work_types.push(row_to_work_type(&row)?);
        }
        for work_type in &mut work_types {
            work_type.assigned_to = load_assignees(conn, work_type.id).await?;
        }
        Ok(work_types)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id or
    /// `DatabaseError::Validation` for an unknown assignee.
    pub async fn update_work_type(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: WorkTypeUpdate,
    ) -> Result<WorkType, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<WorkType, DatabaseError> = async {
            let before = fetch_work_type(&tx, id).await?;
            let mut set = SetClause::new();
            if let Some(ref name) = update.name {
                set.set("name", name.as_str());
            }
            if let Some(ref description) = update.description {
                set.set("description", description.as_str());
            }
            if let Some(cost) = update.cost {
                set.set("cost", cost);
            }
            if set.is_empty() && update.assigned_to.is_none() {
                return Ok(before);
            }
            if !set.is_empty() {
                set.execute(&tx, "work_types", id).await?;
            }
            if let Some(ref users) = update.assigned_to {
                replace_assignees(&tx, id, users).await?;
            }
            let after = fetch_work_type(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no work type has this id.
    pub async fn delete_work_type(
        &self,
        actor: Option<&Actor>,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let work_type = fetch_work_type(&tx, id).await?;
            self.delete_tracked(&tx, actor, &work_type).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use brig_config::BrigConfig;
    use brig_core::enums::AuditAction;

    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{seed_actor, seed_project, test_service, test_service_with};
    use crate::updates::estimate::EstimateUpdateBuilder;
    use crate::updates::work_type::WorkTypeUpdateBuilder;

    #[tokio::test]
    async fn estimate_requires_existing_project() {
        let svc = test_service().await;
        let result = svc.create_estimate(None, NewEstimate::new(77, "Frame", 1.0)).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn audited_estimate_repr_carries_project_name() {
        let mut config = BrigConfig::default();
        config.audit.audited_kinds.push(EntityKind::Estimate);
        let svc = test_service_with(&config).await;
        let project = seed_project(&svc, None, "Acme Tower").await;

        let estimate = svc
            .create_estimate(None, NewEstimate::new(project.id, "Frame", 10.0))
            .await
            .unwrap();
        assert_eq!(estimate.project_name, "Acme Tower");
        svc.update_estimate(None, estimate.id, EstimateUpdateBuilder::new().name("Roof").build())
            .await
            .unwrap();
        svc.delete_estimate(None, estimate.id).await.unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                object_type: Some("Estimate".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        let reprs: Vec<(AuditAction, &str)> = entries
            .iter()
            .map(|e| (e.action, e.object_repr.as_str()))
            .collect();
        assert_eq!(
            reprs,
            vec![
                (AuditAction::Delete, "Acme Tower - Roof"),
                (AuditAction::Update, "Acme Tower - Roof"),
                (AuditAction::Create, "Acme Tower - Frame"),
            ]
        );
    }

    #[tokio::test]
    async fn work_type_assignees_round_trip_and_replace() {
        let svc = test_service().await;
        let (a, _) = seed_actor(&svc, "a").await;
        let (b, _) = seed_actor(&svc, "b").await;
        let project = seed_project(&svc, None, "Tower").await;
        let estimate = svc
            .create_estimate(None, NewEstimate::new(project.id, "Frame", 10.0))
            .await
            .unwrap();

        let mut new = NewWorkType::new(estimate.id, "Welding", 5.0);
        new.assigned_to = vec![b.id, a.id];
        let wt = svc.create_work_type(None, new).await.unwrap();
        assert_eq!(wt.assigned_to, vec![a.id, b.id]);

        let updated = svc
            .update_work_type(None, wt.id, WorkTypeUpdateBuilder::new().assigned_to(vec![b.id]).build())
            .await
            .unwrap();
        assert_eq!(updated.assigned_to, vec![b.id]);

        let listed = svc.list_work_types(Some(estimate.id)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].assigned_to, vec![b.id]);
    }

    #[tokio::test]
    async fn unknown_assignee_rolls_back_work_type() {
        let svc = test_service().await;
        let project = seed_project(&svc, None, "Tower").await;
        let estimate = svc
            .create_estimate(None, NewEstimate::new(project.id, "Frame", 10.0))
            .await
            .unwrap();
        let mut new = NewWorkType::new(estimate.id, "Welding", 5.0);
        new.assigned_to = vec![404];

        assert!(svc.create_work_type(None, new).await.is_err());
        assert!(svc.list_work_types(None).await.unwrap().is_empty());
    }
}
