//! Tool and material movement journals.
//!
//! Journals are append-only from the API's point of view: entries are
//! created and listed, and disappear only with their tool or material.
//! Recording a material movement also adjusts the material's stock.

use brig_core::actor::Actor;
use brig_core::entities::{MaterialMovement, NewMaterialMovement, NewToolMovement, ToolMovement};
use brig_core::enums::{EntityKind, MovementType};
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{now_timestamp, parse_datetime, parse_enum};
use crate::repos::material::fetch_material;
use crate::repos::tool::fetch_tool;
use crate::service::{BrigService, settle};

const TOOL_MOVEMENT_COLUMNS: &str =
    "id, tool_id, date, from_location, to_location, moved_by, note FROM tool_movements";
const MATERIAL_MOVEMENT_COLUMNS: &str =
    "id, material_id, date, quantity, movement_type, project, note FROM material_movements";

fn row_to_tool_movement(row: &libsql::Row) -> Result<ToolMovement, DatabaseError> {
    Ok(ToolMovement {
        id: row.get::<i64>(0)?,
        tool_id: row.get::<i64>(1)?,
        date: parse_datetime(&row.get::<String>(2)?)?,
        from_location: row.get::<String>(3)?,
        to_location: row.get::<String>(4)?,
        moved_by: row.get::<String>(5)?,
        note: row.get::<String>(6)?,
    })
}

fn row_to_material_movement(row: &libsql::Row) -> Result<MaterialMovement, DatabaseError> {
    Ok(MaterialMovement {
        id: row.get::<i64>(0)?,
        material_id: row.get::<i64>(1)?,
        date: parse_datetime(&row.get::<String>(2)?)?,
        quantity: row.get::<f64>(3)?,
        movement_type: parse_enum(&row.get::<String>(4)?)?,
        project: row.get::<String>(5)?,
        note: row.get::<String>(6)?,
    })
}

impl BrigService {
    /// Record a tool moving between locations; the tool's location follows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the tool does not exist.
    pub async fn create_tool_movement(
        &self,
        actor: Option<&Actor>,
        new: NewToolMovement,
    ) -> Result<ToolMovement, DatabaseError> {
        let tx = self.begin().await?;
        let result: Result<ToolMovement, DatabaseError> = async {
            let tool = fetch_tool(&tx, new.tool_id).await?;
            let from = if new.from_location.is_empty() {
                tool.location.clone()
            } else {
                new.from_location.clone()
            };
            let date = now_timestamp();
            tx.execute(
                "INSERT INTO tool_movements (tool_id, date, from_location, to_location, moved_by, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    new.tool_id,
                    date.as_str(),
                    from.as_str(),
                    new.to_location.as_str(),
                    new.moved_by.as_str(),
                    new.note.as_str()
                ],
            )
            .await?;
            let movement = ToolMovement {
                id: tx.last_insert_rowid(),
                tool_id: new.tool_id,
                date: parse_datetime(&date)?,
                from_location: from,
                to_location: new.to_location.clone(),
                moved_by: new.moved_by.clone(),
                note: new.note.clone(),
            };
            if !new.to_location.is_empty() {
                tx.execute(
                    "UPDATE tools SET location = ?1 WHERE id = ?2",
                    libsql::params![new.to_location.as_str(), new.tool_id],
                )
                .await?;
            }
            let event = DomainEvent::created(&movement);
            self.commit_mutation(&tx, actor, Mutation::new(movement, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Tool movements, newest first, optionally for one tool.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_tool_movements(
        &self,
        tool_id: Option<i64>,
    ) -> Result<Vec<ToolMovement>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match tool_id {
            Some(tool_id) => {
                conn.query(
                    &format!("SELECT {TOOL_MOVEMENT_COLUMNS} WHERE tool_id = ?1 ORDER BY date DESC, id DESC"),
                    [tool_id],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!("SELECT {TOOL_MOVEMENT_COLUMNS} ORDER BY date DESC, id DESC"),
                    (),
                )
                .await?
            }
        };
        let mut movements = Vec::new();
        while let Some(row) = rows.next().await? {
            movements.push(row_to_tool_movement(&row)?);
        }
        Ok(movements)
    }

    /// Record material coming in or going out and adjust its stock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if an expense exceeds the stock,
    /// `DatabaseError::NotFound` if the material does not exist.
    pub async fn create_material_movement(
        &self,
        actor: Option<&Actor>,
        new: NewMaterialMovement,
    ) -> Result<MaterialMovement, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<MaterialMovement, DatabaseError> = async {
            let material = fetch_material(&tx, new.material_id).await?;
            let stock = match new.movement_type {
                MovementType::Income => material.quantity + new.quantity,
                MovementType::Expense => material.quantity - new.quantity,
            };
            if stock < 0.0 {
                return Err(DatabaseError::validation(format!(
                    "{} in stock, cannot issue {}",
                    material.quantity, new.quantity
                )));
            }
            let date = now_timestamp();
            tx.execute(
                "INSERT INTO material_movements (material_id, date, quantity, movement_type, project, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    new.material_id,
                    date.as_str(),
                    new.quantity,
                    new.movement_type.as_str(),
                    new.project.as_str(),
                    new.note.as_str()
                ],
            )
            .await?;
            let movement = MaterialMovement {
                id: tx.last_insert_rowid(),
                material_id: new.material_id,
                date: parse_datetime(&date)?,
                quantity: new.quantity,
                movement_type: new.movement_type,
                project: new.project.clone(),
                note: new.note.clone(),
            };
            tx.execute(
                "UPDATE materials SET quantity = ?1 WHERE id = ?2",
                libsql::params![stock, new.material_id],
            )
            .await?;
            let event = DomainEvent::created(&movement);
            self.commit_mutation(&tx, actor, Mutation::new(movement, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Material movements, newest first, optionally for one material.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_material_movements(
        &self,
        material_id: Option<i64>,
    ) -> Result<Vec<MaterialMovement>, DatabaseError> {
        let conn = self.db().conn();
        let mut rows = match material_id {
            Some(material_id) => {
                conn.query(
                    &format!("SELECT {MATERIAL_MOVEMENT_COLUMNS} WHERE material_id = ?1 ORDER BY date DESC, id DESC"),
                    [material_id],
                )
                .await?
            }
            None => {
                conn.query(
                    &format!("SELECT {MATERIAL_MOVEMENT_COLUMNS} ORDER BY date DESC, id DESC"),
                    (),
                )
                .await?
            }
        };
        let mut movements = Vec::new();
        while let Some(row) = rows.next().await? {
            movements.push(row_to_material_movement(&row)?);
        }
        Ok(movements)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no movement has this id.
    pub async fn get_material_movement(&self, id: i64) -> Result<MaterialMovement, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {MATERIAL_MOVEMENT_COLUMNS} WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityKind::MaterialMovement, id))?;
        row_to_material_movement(&row)
    }
}
