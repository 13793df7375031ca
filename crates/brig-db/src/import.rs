//! Bulk natural-key import of spreadsheet rows.
//!
//! Rows arrive already parsed: one JSON object per data row, keyed by
//! normalized header text. Each row is upserted in its own transaction, so
//! a failing row aborts the import while the rows before it stay written.
//! Row numbers in errors and audit details are 1-based and exclude the
//! header.

use brig_core::actor::Actor;
use brig_core::audit_detail::ImportDetail;
use brig_core::entities::{Material, NewMaterial, NewUser, User};
use brig_core::events::{DomainEvent, Mutation};
use brig_core::responses::ImportSummary;
use serde_json::{Map, Value};

use crate::error::DatabaseError;
use crate::repos::material::{apply_material_update, fetch_material, find_material_by_name, insert_material};
use crate::repos::user::{apply_user_update, fetch_user, find_role_by_name, find_user_by_username, insert_user};
use crate::service::{BrigService, settle};
use crate::updates::material::MaterialUpdate;
use crate::updates::user::UserUpdate;

/// One data row: header → cell.
pub type SheetRow = Map<String, Value>;

/// Unit given to imported materials whose row has none.
pub const DEFAULT_UNIT: &str = "шт";

const NAME: &[&str] = &["name", "название", "наименование"];
const QUANTITY: &[&str] = &["quantity", "количество", "кол-во"];
const UNIT: &[&str] = &["unit", "единица", "ед. изм."];
const MIN_STOCK: &[&str] = &["min_stock", "минимальный остаток"];

const USERNAME: &[&str] = &["username", "логин"];
const FIRST_NAME: &[&str] = &["first_name", "имя"];
const LAST_NAME: &[&str] = &["last_name", "фамилия"];
const EMAIL: &[&str] = &["email", "почта"];
const PHONE: &[&str] = &["phone", "телефон"];
const ADDRESS: &[&str] = &["address", "адрес"];
const SALARY: &[&str] = &["salary", "зарплата", "оклад"];
const ROLE: &[&str] = &["role", "роль", "должность"];

fn cell<'a>(row: &'a SheetRow, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| row.get(*key))
        .filter(|v| !v.is_null())
}

/// Text content of a cell; numbers are rendered without a trailing `.0`.
fn text(row: &SheetRow, aliases: &[&str]) -> Option<String> {
    let rendered = match cell(row, aliases)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!rendered.is_empty()).then_some(rendered)
}

fn required_text(row: &SheetRow, aliases: &[&str]) -> Result<String, String> {
    text(row, aliases).ok_or_else(|| format!("missing required column '{}'", aliases[0]))
}

/// Numeric cell; numeric text with a decimal comma is accepted.
fn number(row: &SheetRow, aliases: &[&str]) -> Result<Option<f64>, String> {
    match cell(row, aliases) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("column '{}': '{s}' is not a number", aliases[0])),
        Some(other) => Err(format!("column '{}': {other} is not a number", aliases[0])),
    }
}

struct MaterialRow {
    name: String,
    quantity: Option<f64>,
    unit: Option<String>,
    min_stock: Option<f64>,
}

fn parse_material_row(row: &SheetRow) -> Result<MaterialRow, String> {
    Ok(MaterialRow {
        name: required_text(row, NAME)?,
        quantity: number(row, QUANTITY)?,
        unit: text(row, UNIT),
        min_stock: number(row, MIN_STOCK)?,
    })
}

struct UserRow {
    username: String,
    role: Option<String>,
    update: UserUpdate,
}

fn parse_user_row(row: &SheetRow) -> Result<UserRow, String> {
    Ok(UserRow {
        username: required_text(row, USERNAME)?,
        role: text(row, ROLE),
        update: UserUpdate {
            username: None,
            first_name: text(row, FIRST_NAME),
            last_name: text(row, LAST_NAME),
            email: text(row, EMAIL),
            role_id: None,
            salary: number(row, SALARY)?,
            phone: text(row, PHONE),
            address: text(row, ADDRESS),
        },
    })
}

fn row_error(row: usize) -> impl Fn(DatabaseError) -> DatabaseError {
    move |err| match err {
        DatabaseError::Validation(reason) => DatabaseError::Import { row, reason },
        DatabaseError::NotFound { entity, id } => DatabaseError::Import {
            row,
            reason: format!("{entity} {id} not found"),
        },
        other => other,
    }
}

impl BrigService {
    /// Upsert materials by `name`. When several materials share a name the
    /// lowest id wins; later rows for the same name overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Import` for the first malformed row; rows
    /// before it stay committed.
    pub async fn import_materials(
        &self,
        actor: Option<&Actor>,
        rows: &[SheetRow],
    ) -> Result<ImportSummary, DatabaseError> {
        let mut summary = ImportSummary::default();
        for (idx, raw) in rows.iter().enumerate() {
            let row = idx + 1;
            let parsed =
                parse_material_row(raw).map_err(|reason| DatabaseError::Import { row, reason })?;
            let tx = self.begin().await?;
            let result = self.upsert_material(&tx, actor, parsed, row).await;
            let created = settle(tx, result).await.map_err(row_error(row))?;
            if created {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
        }
        tracing::info!(created = summary.created, updated = summary.updated, "materials imported");
        Ok(summary)
    }

    async fn upsert_material(
        &self,
        conn: &libsql::Connection,
        actor: Option<&Actor>,
        parsed: MaterialRow,
        row: usize,
    ) -> Result<bool, DatabaseError> {
        let (material, created): (Material, bool) = match find_material_by_name(conn, &parsed.name).await? {
            Some(existing) => {
                let update = MaterialUpdate {
                    name: None,
                    quantity: parsed.quantity,
                    unit: parsed.unit,
                    min_stock: parsed.min_stock,
                };
                update.validate()?;
                apply_material_update(conn, existing.id, &update).await?;
                (fetch_material(conn, existing.id).await?, false)
            }
            None => {
                let mut new = NewMaterial::new(
                    parsed.name,
                    parsed.quantity.unwrap_or(0.0),
                    parsed.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
                );
                new.min_stock = parsed.min_stock.unwrap_or(0.0);
                new.validate()?;
                (insert_material(conn, &new).await?, true)
            }
        };
        let event = DomainEvent::imported(&material, &ImportDetail { row, created });
        self.commit_mutation(conn, actor, Mutation::new(material, event))
            .await?;
        Ok(created)
    }

    /// Upsert users by `username`. Cells left empty keep the stored value;
    /// a `role` cell must name an existing role.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Import` for the first malformed row; rows
    /// before it stay committed.
    pub async fn import_users(
        &self,
        actor: Option<&Actor>,
        rows: &[SheetRow],
    ) -> Result<ImportSummary, DatabaseError> {
        let mut summary = ImportSummary::default();
        for (idx, raw) in rows.iter().enumerate() {
            let row = idx + 1;
            let parsed = parse_user_row(raw).map_err(|reason| DatabaseError::Import { row, reason })?;
            let tx = self.begin().await?;
            let result = self.upsert_user(&tx, actor, parsed, row).await;
            let created = settle(tx, result).await.map_err(row_error(row))?;
            if created {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
        }
        tracing::info!(created = summary.created, updated = summary.updated, "users imported");
        Ok(summary)
    }

    async fn upsert_user(
        &self,
        conn: &libsql::Connection,
        actor: Option<&Actor>,
        parsed: UserRow,
        row: usize,
    ) -> Result<bool, DatabaseError> {
        let mut update = parsed.update;
        if let Some(ref role) = parsed.role {
            let found = find_role_by_name(conn, role)
                .await?
                .ok_or_else(|| DatabaseError::validation(format!("unknown role '{role}'")))?;
            update.role_id = Some(Some(found.id));
        }
        update.validate()?;

        let (user, created): (User, bool) = match find_user_by_username(conn, &parsed.username).await? {
            Some(existing) => {
                apply_user_update(conn, existing.id, &update).await?;
                (fetch_user(conn, existing.id).await?, false)
            }
            None => {
                let new = NewUser {
                    username: parsed.username,
                    first_name: update.first_name.unwrap_or_default(),
                    last_name: update.last_name.unwrap_or_default(),
                    email: update.email.unwrap_or_default(),
                    role_id: update.role_id.flatten(),
                    salary: update.salary.unwrap_or(0.0),
                    phone: update.phone.unwrap_or_default(),
                    address: update.address.unwrap_or_default(),
                };
                new.validate()?;
                (insert_user(conn, &new).await?, true)
            }
        };
        let event = DomainEvent::imported(&user, &ImportDetail { row, created });
        self.commit_mutation(conn, actor, Mutation::new(user, event))
            .await?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::entities::NewRole;
    use brig_core::enums::AuditAction;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;

    fn rows(value: Value) -> Vec<SheetRow> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[rstest]
    #[case(json!(10), Some(10.0))]
    #[case(json!("7,5"), Some(7.5))]
    #[case(json!(" 3 "), Some(3.0))]
    #[case(json!(""), None)]
    #[case(Value::Null, None)]
    fn numeric_cells(#[case] value: Value, #[case] expected: Option<f64>) {
        let row = rows(json!([{ "quantity": value }])).remove(0);
        assert_eq!(number(&row, QUANTITY).unwrap(), expected);
    }

    #[test]
    fn whole_numbers_render_as_integers() {
        let row = rows(json!([{ "username": 1001 }])).remove(0);
        assert_eq!(text(&row, USERNAME).as_deref(), Some("1001"));
    }

    #[tokio::test]
    async fn later_rows_overwrite_earlier_ones() {
        let svc = test_service().await;
        let summary = svc
            .import_materials(
                None,
                &rows(json!([
                    {"name": "Cement", "quantity": 10, "unit": "bag"},
                    {"name": "Cement", "quantity": 5},
                ])),
            )
            .await
            .unwrap();
        assert_eq!(summary, ImportSummary { created: 1, updated: 1 });

        let materials = svc.list_materials().await.unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].quantity, 5.0);
        assert_eq!(materials[0].unit, "bag");

        let imports = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Import),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].extra.as_ref().unwrap()["row"], 2);
        assert_eq!(imports[0].extra.as_ref().unwrap()["created"], false);
    }

    #[tokio::test]
    async fn bad_row_aborts_but_keeps_earlier_rows() {
        let svc = test_service().await;
        let result = svc
            .import_materials(
                None,
                &rows(json!([
                    {"name": "Sand", "quantity": 3},
                    {"name": "Gravel", "quantity": "lots"},
                    {"name": "Lime", "quantity": 1},
                ])),
            )
            .await;

        match result {
            Err(DatabaseError::Import { row, reason }) => {
                assert_eq!(row, 2);
                assert!(reason.contains("not a number"));
            }
            other => panic!("expected import error, got {other:?}"),
        }
        let names: Vec<_> = svc
            .list_materials()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Sand"]);
    }

    #[tokio::test]
    async fn users_upsert_by_username_with_role_lookup() {
        let svc = test_service().await;
        svc.create_role(
            None,
            NewRole {
                name: "Прораб".into(),
                description: String::new(),
            },
        )
        .await
        .unwrap();
        svc.create_user(None, NewUser::new("petrov")).await.unwrap();

        let summary = svc
            .import_users(
                None,
                &rows(json!([
                    {"username": "petrov", "фамилия": "Петров", "role": "Прораб"},
                    {"username": "sidorov", "salary": "90000"},
                ])),
            )
            .await
            .unwrap();
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.created, 1);

        let petrov = svc.find_user("petrov").await.unwrap().unwrap();
        assert_eq!(petrov.last_name, "Петров");
        assert!(petrov.role_id.is_some());
        let sidorov = svc.find_user("sidorov").await.unwrap().unwrap();
        assert_eq!(sidorov.salary, 90000.0);
    }

    #[tokio::test]
    async fn unknown_role_is_a_row_error() {
        let svc = test_service().await;
        let result = svc
            .import_users(None, &rows(json!([{"username": "x", "role": "Космонавт"}])))
            .await;
        assert!(matches!(result, Err(DatabaseError::Import { row: 1, .. })));
        assert!(svc.find_user("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_key_column_is_reported() {
        let svc = test_service().await;
        let result = svc
            .import_users(None, &rows(json!([{"email": "a@b.c"}])))
            .await;
        match result {
            Err(DatabaseError::Import { row: 1, reason }) => assert!(reason.contains("username")),
            other => panic!("expected import error, got {other:?}"),
        }
    }
}
