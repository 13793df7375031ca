//! Tool repository.

use brig_core::actor::Actor;
use brig_core::entities::{NewTool, Tool};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, get_opt_string, opt_date, parse_optional_date};
use crate::service::{BrigService, settle};
use crate::updates::tool::ToolUpdate;

const TOOL_COLUMNS: &str = "id, name, quantity, condition, location, last_check FROM tools";

fn row_to_tool(row: &libsql::Row) -> Result<Tool, DatabaseError> {
    let quantity = row.get::<i64>(2)?;
    Ok(Tool {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        quantity: u32::try_from(quantity)
            .map_err(|_| DatabaseError::InvalidState(format!("tool quantity {quantity}")))?,
        condition: row.get::<String>(3)?,
        location: row.get::<String>(4)?,
        last_check: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
    })
}

pub(crate) async fn fetch_tool(conn: &libsql::Connection, id: i64) -> Result<Tool, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {TOOL_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Tool, id))?;
    row_to_tool(&row)
}

impl BrigService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input.
    pub async fn create_tool(
        &self,
        actor: Option<&Actor>,
        new: NewTool,
    ) -> Result<Tool, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Tool, DatabaseError> = async {
            tx.execute(
                "INSERT INTO tools (name, quantity, condition, location, last_check)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    new.name.as_str(),
                    i64::from(new.quantity),
                    new.condition.as_str(),
                    new.location.as_str(),
                    opt_date(new.last_check)
                ],
            )
            .await?;
            let tool = Tool {
                id: tx.last_insert_rowid(),
                name: new.name.clone(),
                quantity: new.quantity,
                condition: new.condition.clone(),
                location: new.location.clone(),
                last_check: new.last_check,
            };
            let event = DomainEvent::created(&tool);
            self.commit_mutation(&tx, actor, Mutation::new(tool, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no tool has this id.
    pub async fn get_tool(&self, id: i64) -> Result<Tool, DatabaseError> {
        fetch_tool(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {TOOL_COLUMNS} ORDER BY id"), ())
            .await?;
        let mut tools = Vec::new();
        while let Some(row) = rows.next().await? {
            tools.push(row_to_tool(&row)?);
        }
        Ok(tools)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn update_tool(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: ToolUpdate,
    ) -> Result<Tool, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<Tool, DatabaseError> = async {
            let before = fetch_tool(&tx, id).await?;

            let mut set = SetClause::new();
            if let Some(ref name) = update.name {
                set.set("name", name.as_str());
            }
            if let Some(quantity) = update.quantity {
                set.set("quantity", i64::from(quantity));
            }
            if let Some(ref condition) = update.condition {
                set.set("condition", condition.as_str());
            }
            if let Some(ref location) = update.location {
                set.set("location", location.as_str());
            }
            if let Some(last_check) = update.last_check {
                set.set("last_check", opt_date(last_check));
            }
            if set.is_empty() {
                return Ok(before);
            }
            set.execute(&tx, "tools", id).await?;

            let after = fetch_tool(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Delete a tool with its movement journal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no tool has this id.
    pub async fn delete_tool(&self, actor: Option<&Actor>, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let tool = fetch_tool(&tx, id).await?;
            self.delete_tracked(&tx, actor, &tool).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::test_support::helpers::{count_rows, test_service};
    use crate::updates::tool::ToolUpdateBuilder;

    #[tokio::test]
    async fn tools_are_not_audited_by_default() {
        let svc = test_service().await;
        let drill = svc.create_tool(None, NewTool::new("Перфоратор", 2)).await.unwrap();
        svc.update_tool(
            None,
            drill.id,
            ToolUpdateBuilder::new()
                .location("Склад 2")
                .last_check(NaiveDate::from_ymd_opt(2024, 5, 1))
                .build(),
        )
        .await
        .unwrap();
        svc.delete_tool(None, drill.id).await.unwrap();

        assert_eq!(count_rows(&svc, "audit_log").await, 0);
        assert_eq!(count_rows(&svc, "tools").await, 0);
    }

    #[tokio::test]
    async fn update_round_trips_dates() {
        let svc = test_service().await;
        let drill = svc.create_tool(None, NewTool::new("Перфоратор", 1)).await.unwrap();
        let checked = NaiveDate::from_ymd_opt(2024, 5, 1);
        let updated = svc
            .update_tool(None, drill.id, ToolUpdateBuilder::new().last_check(checked).build())
            .await
            .unwrap();
        assert_eq!(updated.last_check, checked);
        assert_eq!(updated.condition, "Исправен");
    }
}
