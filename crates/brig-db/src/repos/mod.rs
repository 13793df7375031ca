//! Entity repositories, implemented as `impl BrigService` blocks.
//!
//! Public methods open their own transaction; `pub(crate)` free functions
//! take a connection so they can run inside someone else's.

pub mod audit;
pub mod comment;
pub mod estimate;
pub mod material;
pub mod movement;
pub mod notification;
pub mod project;
pub mod report;
pub mod tool;
pub mod user;
pub mod work_time;

use brig_core::actor::Actor;
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Tracked};

use crate::cascade::{delete_with_references, table_for};
use crate::error::DatabaseError;
use crate::service::BrigService;

/// Fail with a validation error unless a `kind` row with `id` exists.
pub(crate) async fn ensure_exists(
    conn: &libsql::Connection,
    kind: EntityKind,
    id: i64,
    field: &str,
) -> Result<(), DatabaseError> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table_for(kind));
    let mut rows = conn.query(&sql, [id]).await?;
    if rows.next().await?.is_none() {
        return Err(DatabaseError::validation(format!(
            "{field}: {} {id} does not exist",
            kind.type_name()
        )));
    }
    Ok(())
}

impl BrigService {
    /// Dispatch the delete event for `entity` while its row still exists,
    /// then resolve references and remove it.
    pub(crate) async fn delete_tracked<T: Tracked>(
        &self,
        conn: &libsql::Connection,
        actor: Option<&Actor>,
        entity: &T,
    ) -> Result<(), DatabaseError> {
        let id = entity
            .object_id()
            .ok_or_else(|| DatabaseError::InvalidState(format!("{} without id", T::KIND)))?;
        self.dispatcher()
            .apply(conn, actor, &[DomainEvent::deleted(entity)])
            .await?;
        delete_with_references(conn, T::KIND, id).await?;
        Ok(())
    }
}
