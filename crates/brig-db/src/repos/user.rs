//! User and role repository.
//!
//! Users are personnel: creating or deleting one also notifies the acting
//! user (see `dispatch::PersonnelNotifier`).

use brig_core::actor::Actor;
use brig_core::entities::{NewRole, NewUser, Role, User};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, now_timestamp, opt_int, parse_datetime};
use crate::repos::ensure_exists;
use crate::service::{BrigService, settle};
use crate::updates::user::UserUpdate;

const USER_COLUMNS: &str = "id, username, first_name, last_name, email, role_id, salary, phone, address, date_joined FROM users";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<i64>(0)?,
        username: row.get::<String>(1)?,
        first_name: row.get::<String>(2)?,
        last_name: row.get::<String>(3)?,
        email: row.get::<String>(4)?,
        role_id: row.get::<Option<i64>>(5)?,
        salary: row.get::<f64>(6)?,
        phone: row.get::<String>(7)?,
        address: row.get::<String>(8)?,
        date_joined: parse_datetime(&row.get::<String>(9)?)?,
    })
}

fn row_to_role(row: &libsql::Row) -> Result<Role, DatabaseError> {
    Ok(Role {
        id: row.get::<i64>(0)?,
        name: row.get::<String>(1)?,
        description: row.get::<String>(2)?,
    })
}

pub(crate) async fn fetch_user(conn: &libsql::Connection, id: i64) -> Result<User, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {USER_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::User, id))?;
    row_to_user(&row)
}

pub(crate) async fn find_user_by_username(
    conn: &libsql::Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {USER_COLUMNS} WHERE username = ?1"), [username])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn find_role_by_name(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<Role>, DatabaseError> {
    let mut rows = conn
        .query("SELECT id, name, description FROM roles WHERE name = ?1", [name])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_role(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert_user(
    conn: &libsql::Connection,
    new: &NewUser,
) -> Result<User, DatabaseError> {
    if find_user_by_username(conn, &new.username).await?.is_some() {
        return Err(DatabaseError::validation(format!(
            "username '{}' is already taken",
            new.username
        )));
    }
    if let Some(role_id) = new.role_id {
        ensure_exists(conn, EntityKind::Role, role_id, "role_id").await?;
    }
    let joined = now_timestamp();
    conn.execute(
        "INSERT INTO users (username, first_name, last_name, email, role_id, salary, phone, address, date_joined)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        libsql::params![
            new.username.as_str(),
            new.first_name.as_str(),
            new.last_name.as_str(),
            new.email.as_str(),
            opt_int(new.role_id),
            new.salary,
            new.phone.as_str(),
            new.address.as_str(),
            joined.as_str()
        ],
    )
    .await?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: new.username.clone(),
        first_name: new.first_name.clone(),
        last_name: new.last_name.clone(),
        email: new.email.clone(),
        role_id: new.role_id,
        salary: new.salary,
        phone: new.phone.clone(),
        address: new.address.clone(),
        date_joined: parse_datetime(&joined)?,
    })
}

/// Write the set fields of `update` to user `id`; returns whether anything changed.
pub(crate) async fn apply_user_update(
    conn: &libsql::Connection,
    id: i64,
    update: &UserUpdate,
) -> Result<bool, DatabaseError> {
    if let Some(ref username) = update.username {
        if let Some(other) = find_user_by_username(conn, username).await? {
            if other.id != id {
                return Err(DatabaseError::validation(format!(
                    "username '{username}' is already taken"
                )));
            }
        }
    }
    if let Some(Some(role_id)) = update.role_id {
        ensure_exists(conn, EntityKind::Role, role_id, "role_id").await?;
    }

    let mut set = SetClause::new();
    if let Some(ref username) = update.username {
        set.set("username", username.as_str());
    }
    if let Some(ref first_name) = update.first_name {
        set.set("first_name", first_name.as_str());
    }
    if let Some(ref last_name) = update.last_name {
        set.set("last_name", last_name.as_str());
    }
    if let Some(ref email) = update.email {
        set.set("email", email.as_str());
    }
    if let Some(role_id) = update.role_id {
        set.set("role_id", opt_int(role_id));
    }
    if let Some(salary) = update.salary {
        set.set("salary", salary);
    }
    if let Some(ref phone) = update.phone {
        set.set("phone", phone.as_str());
    }
    if let Some(ref address) = update.address {
        set.set("address", address.as_str());
    }
    if set.is_empty() {
        return Ok(false);
    }
    set.execute(conn, "users", id).await?;
    Ok(true)
}

impl BrigService {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input, a taken
    /// username, or an unknown role.
    pub async fn create_user(
        &self,
        actor: Option<&Actor>,
        new: NewUser,
    ) -> Result<User, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<User, DatabaseError> = async {
            let user = insert_user(&tx, &new).await?;
            let event = DomainEvent::created(&user);
            self.commit_mutation(&tx, actor, Mutation::new(user, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no user has this id.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        fetch_user(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        find_user_by_username(self.db().conn(), username).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {USER_COLUMNS} ORDER BY id"), ())
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown id or
    /// `DatabaseError::Validation` for invalid fields.
    pub async fn update_user(
        &self,
        actor: Option<&Actor>,
        id: i64,
        update: UserUpdate,
    ) -> Result<User, DatabaseError> {
        update.validate()?;
        let tx = self.begin().await?;
        let result: Result<User, DatabaseError> = async {
            let before = fetch_user(&tx, id).await?;
            if !apply_user_update(&tx, id, &update).await? {
                return Ok(before);
            }
            let after = fetch_user(&tx, id).await?;
            let event = DomainEvent::updated(&before, &after);
            self.commit_mutation(&tx, actor, Mutation::new(after, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// Delete a user. Their audit entries survive with the actor cleared;
    /// their inbox, comments, and assignments go with them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no user has this id.
    pub async fn delete_user(&self, actor: Option<&Actor>, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let user = fetch_user(&tx, id).await?;
            self.delete_tracked(&tx, actor, &user).await
        }
        .await;
        settle(tx, result).await
    }

    /// Resolve the caller identity for an authenticated user id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no user has this id.
    pub async fn resolve_actor(&self, user_id: i64) -> Result<Actor, DatabaseError> {
        let user = self.get_user(user_id).await?;
        Ok(Actor::new(user.id, user.username))
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank or duplicate name.
    pub async fn create_role(
        &self,
        actor: Option<&Actor>,
        new: NewRole,
    ) -> Result<Role, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Role, DatabaseError> = async {
            if find_role_by_name(&tx, &new.name).await?.is_some() {
                return Err(DatabaseError::validation(format!(
                    "role '{}' already exists",
                    new.name
                )));
            }
            tx.execute(
                "INSERT INTO roles (name, description) VALUES (?1, ?2)",
                libsql::params![new.name.as_str(), new.description.as_str()],
            )
            .await?;
            let role = Role {
                id: tx.last_insert_rowid(),
                name: new.name.clone(),
                description: new.description.clone(),
            };
            let event = DomainEvent::created(&role);
            self.commit_mutation(&tx, actor, Mutation::new(role, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name, description FROM roles ORDER BY id", ())
            .await?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next().await? {
            roles.push(row_to_role(&row)?);
        }
        Ok(roles)
    }

    /// Delete a role; users holding it keep their record with no role.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no role has this id.
    pub async fn delete_role(&self, actor: Option<&Actor>, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let mut rows = tx
                .query("SELECT id, name, description FROM roles WHERE id = ?1", [id])
                .await?;
            let role = match rows.next().await? {
                Some(row) => row_to_role(&row)?,
                None => return Err(DatabaseError::not_found(EntityKind::Role, id)),
            };
            self.delete_tracked(&tx, actor, &role).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::enums::NotificationLevel;
    use pretty_assertions::assert_eq;

    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{count_rows, seed_actor, test_service};
    use crate::updates::user::UserUpdateBuilder;

    #[tokio::test]
    async fn creating_a_user_audits_and_notifies_the_actor() {
        let svc = test_service().await;
        let (_, admin) = seed_actor(&svc, "admin").await;

        let jdoe = svc
            .create_user(Some(&admin), NewUser::new("jdoe"))
            .await
            .unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                object_id: Some(jdoe.id.to_string()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].object_type, "User");
        assert_eq!(entries[0].object_repr, "jdoe");

        let inbox = svc.list_notifications(Some(&admin), false).await.unwrap();
        let added = inbox
            .iter()
            .find(|n| n.recipient_id == Some(admin.user_id))
            .unwrap();
        assert_eq!(added.title, "Добавлен сотрудник");
        assert_eq!(added.level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let svc = test_service().await;
        seed_actor(&svc, "jdoe").await;
        let result = svc.create_user(None, NewUser::new("jdoe")).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
        assert_eq!(count_rows(&svc, "users").await, 1);
    }

    #[tokio::test]
    async fn deleting_a_user_notifies_with_their_name() {
        let svc = test_service().await;
        let (_, admin) = seed_actor(&svc, "admin").await;
        let (leaving, _) = seed_actor(&svc, "leaving").await;

        svc.delete_user(Some(&admin), leaving.id).await.unwrap();

        assert!(svc.get_user(leaving.id).await.is_err());
        let inbox = svc.list_notifications(Some(&admin), false).await.unwrap();
        let removed = inbox.iter().find(|n| n.title == "Удалён сотрудник").unwrap();
        assert!(removed.message.contains("leaving"));

        let deletes = svc
            .query_audit(&AuditFilter {
                action: Some(brig_core::enums::AuditAction::Delete),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(deletes[0].object_repr, "leaving");
    }

    #[tokio::test]
    async fn role_delete_clears_user_role() {
        let svc = test_service().await;
        let role = svc
            .create_role(
                None,
                NewRole {
                    name: "Прораб".into(),
                    description: String::new(),
                },
            )
            .await
            .unwrap();
        let mut new = NewUser::new("foreman");
        new.role_id = Some(role.id);
        let user = svc.create_user(None, new).await.unwrap();

        svc.delete_role(None, role.id).await.unwrap();
        assert_eq!(svc.get_user(user.id).await.unwrap().role_id, None);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let svc = test_service().await;
        let (user, _) = seed_actor(&svc, "ivan").await;
        let updated = svc
            .update_user(
                None,
                user.id,
                UserUpdateBuilder::new().first_name("Иван").salary(120_000.0).build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Иван");
        assert_eq!(updated.salary, 120_000.0);
        assert_eq!(updated.username, "ivan");
    }

    #[tokio::test]
    async fn resolve_actor_uses_username() {
        let svc = test_service().await;
        let (user, _) = seed_actor(&svc, "ivan").await;
        let actor = svc.resolve_actor(user.id).await.unwrap();
        assert_eq!(actor.username, "ivan");
        assert!(svc.resolve_actor(999).await.is_err());
    }
}
