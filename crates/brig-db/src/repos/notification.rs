//! Notification repository: per-user inbox.
//!
//! Rows are appended by the dispatcher or [`BrigService::notify`] and only
//! ever change through `mark_read`. A `NULL` recipient is a broadcast visible
//! to everyone; its read state is kept per user in `notification_reads`, so
//! one reader never marks it read for the others.

use brig_core::actor::Actor;
use brig_core::entities::{NewNotification, Notification};
use brig_core::enums::{EntityKind, NotificationLevel};

use crate::error::DatabaseError;
use crate::helpers::{now_timestamp, opt_int, parse_datetime, parse_enum};
use crate::service::BrigService;

const NOTIFICATION_COLUMNS: &str =
    "id, recipient_id, title, message, created_at, read, level, link FROM notifications";

/// Read state as seen by the user bound to `?1`.
const READ_FLAG: &str = "CASE WHEN n.recipient_id IS NULL \
     THEN EXISTS (SELECT 1 FROM notification_reads r WHERE r.notification_id = n.id AND r.user_id = ?1) \
     ELSE n.read END";

fn inbox_select() -> String {
    format!(
        "SELECT n.id, n.recipient_id, n.title, n.message, n.created_at, {READ_FLAG}, n.level, n.link \
         FROM notifications n"
    )
}

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get::<i64>(0)?,
        recipient_id: row.get::<Option<i64>>(1)?,
        title: row.get::<String>(2)?,
        message: row.get::<String>(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        read: row.get::<i64>(5)? != 0,
        level: parse_enum(&row.get::<String>(6)?)?,
        link: row.get::<String>(7)?,
    })
}

pub(crate) async fn insert_notification(
    conn: &libsql::Connection,
    new: &NewNotification,
) -> Result<Notification, DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (recipient_id, title, message, created_at, read, level, link)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
        libsql::params![
            opt_int(new.recipient_id),
            new.title.as_str(),
            new.message.as_str(),
            now_timestamp(),
            new.level.as_str(),
            new.link.as_str()
        ],
    )
    .await?;
    fetch_notification(conn, conn.last_insert_rowid()).await
}

async fn fetch_notification(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Notification, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {NOTIFICATION_COLUMNS} WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Notification, id))?;
    row_to_notification(&row)
}

async fn fetch_inbox_entry(
    conn: &libsql::Connection,
    user_id: i64,
    id: i64,
) -> Result<Notification, DatabaseError> {
    let mut rows = conn
        .query(&format!("{} WHERE n.id = ?2", inbox_select()), [user_id, id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Notification, id))?;
    row_to_notification(&row)
}

impl BrigService {
    /// Append a notification. Not idempotent: every call adds a row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails (e.g. unknown recipient).
    pub async fn notify(
        &self,
        recipient_id: Option<i64>,
        title: &str,
        message: &str,
        level: NotificationLevel,
        link: &str,
    ) -> Result<Notification, DatabaseError> {
        let new = NewNotification::new(recipient_id, title, message)
            .with_level(level)
            .with_link(link);
        insert_notification(self.db().conn(), &new).await
    }

    /// Inbox for `actor`: their own notifications plus broadcasts, newest
    /// first. Anonymous callers see broadcasts only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_notifications(
        &self,
        actor: Option<&Actor>,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let mut sql = format!(
            "{} WHERE (n.recipient_id IS NULL OR n.recipient_id = ?1)",
            inbox_select()
        );
        if unread_only {
            sql.push_str(&format!(" AND NOT ({READ_FLAG})"));
        }
        sql.push_str(&format!(
            " ORDER BY n.created_at DESC, n.id DESC LIMIT {}",
            self.default_limit()
        ));

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![opt_int(actor.map(|a| a.user_id))])
            .await?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().await? {
            notifications.push(row_to_notification(&row)?);
        }
        Ok(notifications)
    }

    /// Mark a notification read for `actor`. Idempotent; other users'
    /// notifications are reported as not found. Broadcasts are marked for
    /// this reader only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the notification does not exist
    /// or is addressed to someone else.
    pub async fn mark_read(&self, actor: &Actor, id: i64) -> Result<Notification, DatabaseError> {
        let conn = self.db().conn();
        let mut notification = fetch_inbox_entry(conn, actor.user_id, id).await?;
        if notification
            .recipient_id
            .is_some_and(|recipient| recipient != actor.user_id)
        {
            return Err(DatabaseError::not_found(EntityKind::Notification, id));
        }
        if !notification.read {
            match notification.recipient_id {
                Some(_) => {
                    conn.execute("UPDATE notifications SET read = 1 WHERE id = ?1", [id])
                        .await?;
                }
                None => {
                    conn.execute(
                        "INSERT OR IGNORE INTO notification_reads (notification_id, user_id, read_at)
                         VALUES (?1, ?2, ?3)",
                        libsql::params![id, actor.user_id, now_timestamp()],
                    )
                    .await?;
                }
            }
            notification.read = true;
        }
        Ok(notification)
    }
}
