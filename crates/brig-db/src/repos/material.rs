//! Material repository.

use brig_core::actor::Actor;
use brig_core::entities::{Material, NewMaterial};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::SetClause;
use crate::service::{BrigService, settle};
use crate::updates::material::MaterialUpdate;

const MATERIAL_COLUMNS: &str = "id, name, quantity, unit, min_stock FROM materials";

fn row_to_material(row: &libsql::Row) -> Result<Material, DatabaseError> {
    Ok(Material {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        quantity: row.get::<f64>(2)?,
        unit: row.get::<String>(3)?,
        min_stock: row.get::<f64>(4)?,
    })
}

pub(crate) async fn fetch_material(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Material, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {MATERIAL_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Material, id))?;
    row_to_material(&row)
}

/// First material with this exact name (lowest id); names are not unique.
pub(crate) async fn find_material_by_name(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<Material>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {MATERIAL_COLUMNS} WHERE name = ?1 ORDER BY id LIMIT 1"),
            [name],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_material(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert_material(
    conn: &libsql::Connection,
    new: &NewMaterial,
) -> Result<Material, DatabaseError> {
    conn.execute(
        "INSERT INTO materials (name, quantity, unit, min_stock) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![new.name.as_str(), new.quantity, new.unit.as_str(), new.min_stock],
    )
    .await?;
    Ok(Material {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        quantity: new.quantity,
        unit: new.unit.clone(),
        min_stock: new.min_stock,
    })
}

pub(crate) async fn apply_material_update(
    conn: &libsql::Connection,
    id: i64,
    update: &MaterialUpdate,
) -> Result<bool, DatabaseError> {
    let mut set = SetClause::new();
    if let Some(ref name) = update.name {
        set.set("name", name.as_str());
    }
    if let Some(quantity) = update.quantity {
        set.set("quantity", quantity);
    }
    if let Some(ref unit) = update.unit {
        set.set("unit", unit.as_str());
    }
    if let Some(min_stock) = update.min_stock {
        set.set("min_stock", min_stock);
    }
    if set.is_empty() {
        return Ok(false);
    }
    set.execute(conn, "materials", id).await?;
    Ok(true)
}

impl BrigService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input.
    pub async fn create_material(
        &self,
        actor: Option<&Actor>,
        new: NewMaterial,
    ) -> Result<Material, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Material, DatabaseError> = async {
            let material = insert_material(&tx, &new).await?;
            let event = DomainEvent::created(&material);
            self.commit_mutation(&tx, actor, Mutation::new(material, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no material has this id.
    pub async fn get_material(&self, id: i64) -> Result<Material, DatabaseError> {
        fetch_material(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_materials(&self) -> Result<Vec<Material>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {MATERIAL_COLUMNS} ORDER BY id"), ())
            .await?;
        let mut materials = Vec::new();
        while let Some(row) = rows.next().await? {
            materials.push(row_to_material(&row)?);
        }
        Ok(materials)
    }

    /// Materials whose stock is under their minimum.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn low_stock_materials(&self) -> Result<Vec<Material>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {MATERIAL_COLUMNS} WHERE quantity < min_stock ORDER BY id"),
                (),
            )
            .await?;
        let mut materials = Vec::new();
        while let Some(row) = rows.next().await? {
            materials.push(row_to_material(&row)?);
        }
        Ok(materials)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id.
    pub async fn update_material(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: MaterialUpdate,
    ) -> Result<Material, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<Material, DatabaseError> = async {
            let before = fetch_material(&tx, id).await?;
            if !apply_material_update(&tx, id, &update).await? {
                return Ok(before);
            }
            let after = fetch_material(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Delete a material with its movement journal and comments.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no material has this id.
    pub async fn delete_material(
        &self,
        actor: Option<&Actor>,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let material = fetch_material(&tx, id).await?;
            self.delete_tracked(&tx, actor, &material).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::enums::AuditAction;
    use pretty_assertions::assert_eq;

    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;
    use crate::updates::material::MaterialUpdateBuilder;

    #[tokio::test]
    async fn delete_audits_pre_deletion_repr() {
        let svc = test_service().await;
        let cement = svc
            .create_material(None, NewMaterial::new("Цемент М500", 40.0, "мешок"))
            .await
            .unwrap();
        svc.delete_material(None, cement.id).await.unwrap();

        let deletes = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Delete),
                object_type: Some("Material".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].object_repr, "Цемент М500");
        assert_eq!(deletes[0].object_id, cement.id.to_string());
        assert!(svc.get_material(cement.id).await.is_err());
    }

    #[tokio::test]
    async fn low_stock_lists_only_short_materials() {
        let svc = test_service().await;
        let mut sand = NewMaterial::new("Песок", 2.0, "т");
        sand.min_stock = 5.0;
        svc.create_material(None, sand).await.unwrap();
        svc.create_material(None, NewMaterial::new("Щебень", 10.0, "т"))
            .await
            .unwrap();

        let low = svc.low_stock_materials().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Песок");
        assert!(low[0].below_min_stock());
    }

    #[tokio::test]
    async fn negative_quantity_update_rejected() {
        let svc = test_service().await;
        let m = svc
            .create_material(None, NewMaterial::new("Песок", 2.0, "т"))
            .await
            .unwrap();
        let result = svc
            .update_material(None, m.id, MaterialUpdateBuilder::new().quantity(-1.0).build())
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        assert_eq!(svc.get_material(m.id).await.unwrap().quantity, 2.0);
    }
}
