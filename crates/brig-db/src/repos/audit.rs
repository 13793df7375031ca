//! Audit log repository.
//!
//! Append-only: entries are inserted by the dispatcher (or directly through
//! [`BrigService::record_audit`]) and never edited; the schema rejects
//! updates and deletes. Listing is newest first, ties broken by id.

use brig_core::actor::Actor;
use brig_core::entities::{AuditLog, NewAuditLog};
use brig_core::enums::{AuditAction, EntityKind};
use brig_core::events::{DomainEvent, Tracked};

use crate::dispatch::audit_entry;
use crate::error::DatabaseError;
use crate::helpers::{
    get_opt_string, now_timestamp, opt_int, parse_datetime, parse_enum, parse_optional_json,
};
use crate::service::BrigService;

const AUDIT_COLUMNS: &str = "a.id, a.actor_id, u.username, a.action, a.object_type, a.object_id, \
     a.object_repr, a.timestamp, a.changes, a.extra \
     FROM audit_log a LEFT JOIN users u ON u.id = a.actor_id";

/// Filter criteria for audit queries. All set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Case-insensitive substring over object type, object id, and the
    /// actor's username.
    pub search: Option<String>,
    pub action: Option<AuditAction>,
    pub object_type: Option<String>,
    pub object_id: Option<String>,
    pub actor_id: Option<i64>,
    /// Falls back to the configured default limit.
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditLog, DatabaseError> {
    Ok(AuditLog {
        id: row.get::<i64>(0)?,
        actor_id: row.get::<Option<i64>>(1)?,
        actor: get_opt_string(row, 2)?,
        action: parse_enum(&row.get::<String>(3)?)?,
        object_type: row.get::<String>(4)?,
        object_id: row.get::<String>(5)?,
        object_repr: row.get::<String>(6)?,
        timestamp: parse_datetime(&row.get::<String>(7)?)?,
        changes: parse_optional_json(get_opt_string(row, 8)?.as_deref())?,
        extra: parse_optional_json(get_opt_string(row, 9)?.as_deref())?,
    })
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Insert one audit row on `conn` and read it back.
pub(crate) async fn insert_audit(
    conn: &libsql::Connection,
    entry: &NewAuditLog,
) -> Result<AuditLog, DatabaseError> {
    let changes = entry.changes.as_ref().map(ToString::to_string);
    let extra = entry.extra.as_ref().map(ToString::to_string);
    conn.execute(
        "INSERT INTO audit_log (actor_id, action, object_type, object_id, object_repr, timestamp, changes, extra)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        libsql::params![
            opt_int(entry.actor_id),
            entry.action.as_str(),
            entry.object_type.as_str(),
            entry.object_id.as_str(),
            entry.object_repr.as_str(),
            now_timestamp(),
            changes.as_deref(),
            extra.as_deref()
        ],
    )
    .await?;
    fetch_audit(conn, conn.last_insert_rowid()).await
}

async fn fetch_audit(conn: &libsql::Connection, id: i64) -> Result<AuditLog, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {AUDIT_COLUMNS} WHERE a.id = ?1"), [id])
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    row_to_audit(&row)
}

impl BrigService {
    /// Record one audit entry for `entity` regardless of the audit policy.
    ///
    /// `object_repr` is captured from the entity now, so callers deleting
    /// the entity must record first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn record_audit<T: Tracked>(
        &self,
        actor: Option<&Actor>,
        action: AuditAction,
        entity: &T,
    ) -> Result<AuditLog, DatabaseError> {
        let event = DomainEvent::new(action, entity);
        insert_audit(self.db().conn(), &audit_entry(&event, actor)).await
    }

    /// Append a prepared audit entry (exports, logins).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &NewAuditLog) -> Result<AuditLog, DatabaseError> {
        insert_audit(self.db().conn(), entry).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no entry has this id.
    pub async fn get_audit(&self, id: i64) -> Result<AuditLog, DatabaseError> {
        match fetch_audit(self.db().conn(), id).await {
            Err(DatabaseError::NoResult) => Err(DatabaseError::not_found(EntityKind::AuditLog, id)),
            other => other,
        }
    }

    /// Query audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditLog>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(libsql::Value::Text(like_pattern(search.trim())));
            let n = params.len();
            conditions.push(format!(
                "(a.object_type LIKE ?{n} ESCAPE '\\' OR a.object_id LIKE ?{n} ESCAPE '\\' \
                 OR u.username LIKE ?{n} ESCAPE '\\')"
            ));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("a.action = ?{}", params.len()));
        }
        if let Some(ref object_type) = filter.object_type {
            params.push(libsql::Value::Text(object_type.clone()));
            conditions.push(format!("a.object_type = ?{}", params.len()));
        }
        if let Some(ref object_id) = filter.object_id {
            params.push(libsql::Value::Text(object_id.clone()));
            conditions.push(format!("a.object_id = ?{}", params.len()));
        }
        if let Some(actor_id) = filter.actor_id {
            params.push(libsql::Value::Integer(actor_id));
            conditions.push(format!("a.actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or_else(|| self.default_limit());
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} {where_clause} ORDER BY a.timestamp DESC, a.id DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}
