//! Database migration runner.
//!
//! SQL files are embedded at compile time and applied in order on every
//! open. Statements use `IF NOT EXISTS`, so re-running is a no-op.

use crate::BrigDb;
use crate::error::DatabaseError;

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_initial", include_str!("../migrations/001_initial.sql")),
    ("002_work_times", include_str!("../migrations/002_work_times.sql")),
    (
        "003_notification_reads",
        include_str!("../migrations/003_notification_reads.sql"),
    ),
];

impl BrigDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, sql) in MIGRATIONS {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = *name, "migration applied");
        }
        Ok(())
    }
}
