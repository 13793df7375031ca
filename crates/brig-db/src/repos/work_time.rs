//! Timesheet repository.
//!
//! Entries belong to a user and go with them on delete. The username is
//! joined in on every read so the string form needs no second lookup.

use brig_core::actor::Actor;
use brig_core::entities::{NewWorkTime, WorkTime};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, parse_date};
use crate::repos::ensure_exists;
use crate::service::{BrigService, settle};
use crate::updates::work_time::WorkTimeUpdate;

const WORK_TIME_COLUMNS: &str = "w.id, w.user_id, u.username, w.date, w.hours, w.project, w.description \
     FROM work_times w JOIN users u ON u.id = w.user_id";

fn row_to_work_time(row: &libsql::Row) -> Result<WorkTime, DatabaseError> {
    Ok(WorkTime {
        id: row.get::<i64>(0)?,
        user_id: row.get::<i64>(1)?,
        username: row.get::<String>(2)?,
        date: parse_date(&row.get::<String>(3)?)?,
        hours: row.get::<f64>(4)?,
        project: row.get::<String>(5)?,
        description: row.get::<String>(6)?,
    })
}

async fn fetch_work_time(conn: &libsql::Connection, id: i64) -> Result<WorkTime, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {WORK_TIME_COLUMNS} WHERE w.id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::WorkTime, id))?;
    row_to_work_time(&row)
}

impl BrigService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for hours out of range or an
    /// unknown user.
    pub async fn create_work_time(
        &self,
        actor: Option<&Actor>,
        new: NewWorkTime,
    ) -> Result<WorkTime, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<WorkTime, DatabaseError> = async {
            ensure_exists(&tx, EntityKind::User, new.user_id, "user_id").await?;
            tx.execute(
                "INSERT INTO work_times (user_id, date, hours, project, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    new.user_id,
                    new.date.to_string(),
                    new.hours,
                    new.project.as_str(),
                    new.description.as_str()
                ],
            )
            .await?;
            let entry = fetch_work_time(&tx, tx.last_insert_rowid()).await?;
            let event = DomainEvent::created(&entry);
            self.commit_mutation(&tx, actor, Mutation::new(entry, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no entry has this id.
    pub async fn get_work_time(&self, id: i64) -> Result<WorkTime, DatabaseError> {
        fetch_work_time(self.db().conn(), id).await
    }

    /// Timesheet entries, optionally for one user, oldest day first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_work_times(&self, user_id: Option<i64>) -> Result<Vec<WorkTime>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match user_id {
            Some(user_id) => {
                conn.query(
                    &format!("SELECT {WORK_TIME_COLUMNS} WHERE w.user_id = ?1 ORDER BY w.date, w.id"),
                    [user_id],
                )
                .await?
            }
            None => {
                conn.query(&format!("SELECT {WORK_TIME_COLUMNS} ORDER BY w.date, w.id"), ())
                    .await?
            }
        };
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_work_time(&row)?);
        }
        Ok(entries)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id or
    /// `DatabaseError::Validation` for an unknown user.
    pub async fn update_work_time(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: WorkTimeUpdate,
    ) -> Result<WorkTime, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<WorkTime, DatabaseError> = async {
            let before = fetch_work_time(&tx, id).await?;
            let mut set = SetClause::new();
            if let Some(user_id) = update.user_id {
                ensure_exists(&tx, EntityKind::User, user_id, "user_id").await?;
                set.set("user_id", user_id);
            }
            if let Some(date) = update.date {
                set.set("date", date.to_string());
            }
            if let Some(hours) = update.hours {
                set.set("hours", hours);
            }
            if let Some(ref project) = update.project {
                set.set("project", project.as_str());
            }
            if let Some(ref description) = update.description {
                set.set("description", description.as_str());
            }
            if set.is_empty() {
                return Ok(before);
            }
            set.execute(&tx, "work_times", id).await?;
            let after = fetch_work_time(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no entry has this id.
    pub async fn delete_work_time(
        &self,
        actor: Option<&Actor>,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let entry = fetch_work_time(&tx, id).await?;
            self.delete_tracked(&tx, actor, &entry).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_config::BrigConfig;
    use brig_core::enums::AuditAction;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{count_rows, seed_actor, test_service, test_service_with};
    use crate::updates::work_time::WorkTimeUpdateBuilder;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn entries_list_per_user_in_date_order() {
        let svc = test_service().await;
        let (jdoe, _) = seed_actor(&svc, "jdoe").await;
        let (other, _) = seed_actor(&svc, "other").await;
        svc.create_work_time(None, NewWorkTime::new(jdoe.id, day(2), 8.0))
            .await
            .unwrap();
        svc.create_work_time(None, NewWorkTime::new(jdoe.id, day(1), 6.5))
            .await
            .unwrap();
        svc.create_work_time(None, NewWorkTime::new(other.id, day(1), 4.0))
            .await
            .unwrap();

        let mine = svc.list_work_times(Some(jdoe.id)).await.unwrap();
        let days: Vec<NaiveDate> = mine.iter().map(|w| w.date).collect();
        assert_eq!(days, vec![day(1), day(2)]);
        assert_eq!(mine[0].to_string(), "jdoe - 2024-03-01 - 6.50 ч.");
        assert_eq!(svc.list_work_times(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_user_and_bad_hours_are_rejected() {
        let svc = test_service().await;
        let (jdoe, _) = seed_actor(&svc, "jdoe").await;

        let result = svc.create_work_time(None, NewWorkTime::new(404, day(1), 8.0)).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        let result = svc
            .create_work_time(None, NewWorkTime::new(jdoe.id, day(1), 1000.0))
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        assert_eq!(count_rows(&svc, "work_times").await, 0);
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let svc = test_service().await;
        let (jdoe, _) = seed_actor(&svc, "jdoe").await;
        let entry = svc
            .create_work_time(None, NewWorkTime::new(jdoe.id, day(1), 8.0))
            .await
            .unwrap();

        let updated = svc
            .update_work_time(
                None,
                entry.id,
                WorkTimeUpdateBuilder::new().hours(7.25).project("Acme Tower").build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.hours, 7.25);
        assert_eq!(updated.project, "Acme Tower");

        svc.delete_work_time(None, entry.id).await.unwrap();
        let result = svc.get_work_time(entry.id).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_timesheet() {
        let svc = test_service().await;
        let (jdoe, _) = seed_actor(&svc, "jdoe").await;
        let (other, _) = seed_actor(&svc, "other").await;
        svc.create_work_time(None, NewWorkTime::new(jdoe.id, day(1), 8.0))
            .await
            .unwrap();
        svc.create_work_time(None, NewWorkTime::new(other.id, day(1), 8.0))
            .await
            .unwrap();

        svc.delete_user(None, jdoe.id).await.unwrap();

        let left = svc.list_work_times(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].username, "other");
    }

    #[tokio::test]
    async fn audited_when_configured() {
        let mut config = BrigConfig::default();
        config.audit.audited_kinds.push(EntityKind::WorkTime);
        let svc = test_service_with(&config).await;
        let (jdoe, _) = seed_actor(&svc, "jdoe").await;

        svc.create_work_time(None, NewWorkTime::new(jdoe.id, day(1), 8.0))
            .await
            .unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                object_type: Some("WorkTime".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[0].object_repr, "jdoe - 2024-03-01 - 8.00 ч.");
    }
}
