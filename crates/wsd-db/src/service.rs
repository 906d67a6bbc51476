//! Service layer orchestrating database mutations with the audit trail.
//!
//! `WsdService` wraps `WsdDb` (raw database access), the injected clock and
//! the lease configuration. All repo methods are implemented as
//! `impl WsdService` blocks under `repos/`.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use wsd_config::LockConfig;
use wsd_core::clock::{Clock, SystemClock};

use crate::WsdDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Take the connection gate
/// 2. Begin transaction
/// 3. Execute SQL (conditional writes report zero changed rows, never error)
/// 4. Append audit entries (inside transaction)
/// 5. Commit, or roll back on the first error
///
/// The connection is shared, so every write path holds the gate for the
/// whole transaction and every public read takes it too. A read never sees
/// another task's transaction before it commits or rolls back.
pub struct WsdService {
    db: WsdDb,
    clock: Arc<dyn Clock>,
    lease_duration_secs: i64,
    gate: Mutex<()>,
}

impl WsdService {
    /// Create a new service wrapping a local database and the system clock.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `lock` - Lease configuration stored on every acquired lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, lock: &LockConfig) -> Result<Self, DatabaseError> {
        let db = WsdDb::open_local(db_path).await?;
        Ok(Self::from_db(db, Arc::new(SystemClock), lock))
    }

    /// Create from an existing `WsdDb` with an explicit clock.
    #[must_use]
    pub fn from_db(db: WsdDb, clock: Arc<dyn Clock>, lock: &LockConfig) -> Self {
        Self {
            db,
            clock,
            lease_duration_secs: i64::from(lock.lease_duration_secs),
            gate: Mutex::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &WsdDb {
        &self.db
    }

    /// Access the injected clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Lease duration applied to newly acquired locks.
    #[must_use]
    pub const fn lease_duration_secs(&self) -> i64 {
        self.lease_duration_secs
    }

    pub(crate) async fn gate(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

/// Commit `tx` when `result` is `Ok`, roll it back otherwise.
pub(crate) async fn finish<T, E>(tx: libsql::Transaction, result: Result<T, E>) -> Result<T, E>
where
    E: From<libsql::Error>,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(%rollback, "transaction rollback failed");
            }
            Err(e)
        }
    }
}
