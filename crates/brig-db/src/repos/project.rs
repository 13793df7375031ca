//! Project repository.

use brig_core::actor::Actor;
use brig_core::entities::{NewProject, Project};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, opt_date, opt_int, parse_date, parse_optional_date, get_opt_string};
use crate::repos::ensure_exists;
use crate::service::{BrigService, settle};
use crate::updates::project::ProjectUpdate;

const PROJECT_COLUMNS: &str = "id, name, customer, budget, start_date, end_date, status, description, manager_id FROM projects";

fn row_to_project(row: &libsql::Row) -> Result<Project, DatabaseError> {
    Ok(Project {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        customer: row.get::<String>(2)?,
        budget: row.get::<f64>(3)?,
        start_date: parse_date(&row.get::<String>(4)?)?,
        end_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        status: row.get::<String>(6)?,
        description: row.get::<String>(7)?,
        manager_id: row.get::<Option<i64>>(8)?,
    })
}

pub(crate) async fn fetch_project(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Project, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {PROJECT_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Project, id))?;
    row_to_project(&row)
}

async fn insert_project(
    conn: &libsql::Connection,
    new: &NewProject,
) -> Result<Mutation<Project>, DatabaseError> {
    if let Some(manager_id) = new.manager_id {
        ensure_exists(conn, EntityKind::User, manager_id, "manager_id").await?;
    }
    conn.execute(
        "INSERT INTO projects (name, customer, budget, start_date, end_date, status, description, manager_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        libsql::params![
            new.name.as_str(),
            new.customer.as_str(),
            new.budget,
            new.start_date.to_string(),
            opt_date(new.end_date),
            new.status.as_str(),
            new.description.as_str(),
            opt_int(new.manager_id)
        ],
    )
    .await?;

    let project = Project {
        id: conn.last_insert_rowid(),
        name: new.name.clone(),
        customer: new.customer.clone(),
        budget: new.budget,
        start_date: new.start_date,
        end_date: new.end_date,
        status: new.status.clone(),
        description: new.description.clone(),
        manager_id: new.manager_id,
    };
    let event = DomainEvent::created(&project);
    Ok(Mutation::new(project, event))
}

impl BrigService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input or an unknown
    /// manager, or any storage error; nothing is written on failure.
    pub async fn create_project(
        &self,
        actor: Option<&Actor>,
        new: NewProject,
    ) -> Result<Project, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Project, DatabaseError> = async {
            let mutation = insert_project(&tx, &new).await?;
            self.commit_mutation(&tx, actor, mutation).await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no project has this id.
    pub async fn get_project(&self, id: i64) -> Result<Project, DatabaseError> {
        fetch_project(self.db().conn(), id).await
    }

    /// All projects in id order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_projects(&self) -> Result<Vec<Project>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {PROJECT_COLUMNS} ORDER BY id"), ())
            .await?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(row_to_project(&row)?);
        }
        Ok(projects)
    }

    /// Apply a partial update. The audit entry carries the field diff.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id and
    /// `DatabaseError::Validation` if the merged dates are inverted.
    pub async fn update_project(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: ProjectUpdate,
    ) -> Result<Project, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<Project, DatabaseError> = async {
            let before = fetch_project(&tx, id).await?;

            let start = update.start_date.unwrap_or(before.start_date);
            let end = update.end_date.unwrap_or(before.end_date);
            if end.is_some_and(|end| end < start) {
                return Err(DatabaseError::validation("end_date must not precede start_date"));
            }
            if let Some(Some(manager_id)) = update.manager_id {
                ensure_exists(&tx, EntityKind::User, manager_id, "manager_id").await?;
            }

            let mut set = SetClause::new();
            if let Some(ref name) = update.name {
                set.set("name", name.as_str());
            }
            if let Some(ref customer) = update.customer {
                set.set("customer", customer.as_str());
            }
            if let Some(budget) = update.budget {
                set.set("budget", budget);
            }
            if let Some(start_date) = update.start_date {
                set.set("start_date", start_date.to_string());
            }
            if let Some(end_date) = update.end_date {
                set.set("end_date", opt_date(end_date));
            }
            if let Some(ref status) = update.status {
                set.set("status", status.as_str());
            }
            if let Some(ref description) = update.description {
                set.set("description", description.as_str());
            }
            if let Some(manager_id) = update.manager_id {
                set.set("manager_id", opt_int(manager_id));
            }
            if set.is_empty() {
                return Ok(before);
            }
            set.execute(&tx, "projects", id).await?;

            let after = fetch_project(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Delete a project with its estimates, work types, and comments.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no project has this id.
    pub async fn delete_project(
        &self,
        actor: Option<&Actor>,
        id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let project = fetch_project(&tx, id).await?;
            self.delete_tracked(&tx, actor, &project).await
        }
        .await;
        settle(tx, result).await
    }
}
