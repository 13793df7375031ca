//! # brig-db
//!
//! libSQL storage for Brig: entity repositories, the mutation dispatcher
//! that turns domain events into audit entries and notifications, comment
//! thread assembly, spreadsheet import, and audit export.
//!
//! Every public mutation on [`service::BrigService`] runs in one transaction
//! covering the entity write and all side effects it triggers.

pub mod cascade;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod helpers;
pub mod import;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Database handle: one libSQL database and its connection.
pub struct BrigDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl BrigDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let brig_db = Self { db, conn };
        brig_db.run_migrations().await?;
        Ok(brig_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
