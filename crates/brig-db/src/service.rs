//! Service layer orchestrating database mutations with their side effects.
//!
//! `BrigService` wraps `BrigDb` and the mutation [`Dispatcher`]. All repo
//! methods are implemented as `impl BrigService` in `repos/`.

use brig_config::BrigConfig;
use brig_core::actor::Actor;
use brig_core::events::Mutation;

use crate::BrigDb;
use crate::dispatch::{Applied, Dispatcher};
use crate::error::DatabaseError;

/// Orchestrates database mutations with audit and notification side effects.
///
/// Every mutation method follows this protocol:
/// 1. Begin transaction
/// 2. Execute SQL, producing a [`Mutation`] (entity + domain events)
/// 3. Hand the events to the dispatcher (audit, then notifications)
/// 4. Commit, or roll back everything if any step failed
pub struct BrigService {
    db: BrigDb,
    dispatcher: Dispatcher,
    max_comment_depth: usize,
    default_limit: u32,
}

impl BrigService {
    /// Create a new service wrapping a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, config: &BrigConfig) -> Result<Self, DatabaseError> {
        let db = BrigDb::open_local(db_path).await?;
        Ok(Self::from_db(db, config))
    }

    /// Create from an existing `BrigDb`, wiring handlers from config.
    #[must_use]
    pub fn from_db(db: BrigDb, config: &BrigConfig) -> Self {
        Self {
            db,
            dispatcher: Dispatcher::from_config(&config.audit),
            max_comment_depth: config.comments.max_depth,
            default_limit: config.general.default_limit,
        }
    }

    /// Replace the dispatcher (custom handler sets in tests and embedders).
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    #[must_use]
    pub const fn db(&self) -> &BrigDb {
        &self.db
    }

    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Deepest accepted reply level; top-level comments are depth 0.
    #[must_use]
    pub const fn max_comment_depth(&self) -> usize {
        self.max_comment_depth
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    pub(crate) async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.db.conn().transaction().await?)
    }

    /// Dispatch the mutation's events on `conn` and hand back the entity.
    pub(crate) async fn commit_mutation<T>(
        &self,
        conn: &libsql::Connection,
        actor: Option<&Actor>,
        mutation: Mutation<T>,
    ) -> Result<T, DatabaseError> {
        let applied: Vec<Applied> = self
            .dispatcher
            .apply(conn, actor, &mutation.events)
            .await?;
        tracing::debug!(
            events = mutation.events.len(),
            effects = applied.len(),
            "mutation dispatched"
        );
        Ok(mutation.entity)
    }
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the error.
pub(crate) async fn settle<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
