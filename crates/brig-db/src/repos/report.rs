//! Report repository. Reports are created and deleted, never edited.

use brig_core::actor::Actor;
use brig_core::entities::{NewReport, Report};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, now_timestamp, opt_text, parse_datetime, parse_enum, parse_optional_json,
};
use crate::service::{BrigService, settle};

const REPORT_COLUMNS: &str = "id, name, report_type, created_at, data, file FROM reports";

fn row_to_report(row: &libsql::Row) -> Result<Report, DatabaseError> {
    Ok(Report {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        report_type: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        data: parse_optional_json(get_opt_string(row, 4)?.as_deref())?.unwrap_or_default(),
        file: get_opt_string(row, 5)?,
    })
}

async fn fetch_report(conn: &libsql::Connection, id: i64) -> Result<Report, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {REPORT_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Report, id))?;
    row_to_report(&row)
}

impl BrigService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input.
    pub async fn create_report(
        &self,
        actor: Option<&Actor>,
        new: NewReport,
    ) -> Result<Report, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Report, DatabaseError> = async {
            let created_at = now_timestamp();
            tx.execute(
                "INSERT INTO reports (name, report_type, created_at, data, file) VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    new.name.as_str(),
                    new.report_type.as_str(),
                    created_at.as_str(),
                    new.data.to_string(),
                    opt_text(new.file.as_deref())
                ],
            )
            .await?;
            let report = Report {
                id: tx.last_insert_rowid(),
                name: new.name.clone(),
                report_type: new.report_type,
                created_at: parse_datetime(&created_at)?,
                data: new.data.clone(),
                file: new.file.clone(),
            };
            let event = DomainEvent::created(&report);
            self.commit_mutation(&tx, actor, Mutation::new(report, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no report has this id.
    pub async fn get_report(&self, id: i64) -> Result<Report, DatabaseError> {
        fetch_report(self.db().conn(), id).await
    }

    /// Reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_reports(&self) -> Result<Vec<Report>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {REPORT_COLUMNS} ORDER BY created_at DESC, id DESC"),
                (),
            )
            .await?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().await? {
            reports.push(row_to_report(&row)?);
        }
        Ok(reports)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no report has this id.
    pub async fn delete_report(&self, actor: Option<&Actor>, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let report = fetch_report(&tx, id).await?;
            self.delete_tracked(&tx, actor, &report).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::enums::ReportType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn report_data_round_trips() {
        let svc = test_service().await;
        let report = svc
            .create_report(
                None,
                NewReport {
                    name: "Остатки".into(),
                    report_type: ReportType::Warehouse,
                    data: json!({"materials": 3}),
                    file: Some("reports/stock.xlsx".into()),
                },
            )
            .await
            .unwrap();
        let fetched = svc.get_report(report.id).await.unwrap();
        assert_eq!(fetched.data["materials"], 3);
        assert_eq!(fetched.file.as_deref(), Some("reports/stock.xlsx"));
        assert_eq!(fetched.to_string(), "Остатки (Склад)");

        svc.delete_report(None, report.id).await.unwrap();
        assert!(svc.list_reports().await.unwrap().is_empty());
    }
}
