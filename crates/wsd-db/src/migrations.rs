//! Embedded schema migrations, applied in order every time the database opens.
//!
//! Every statement is guarded with `IF NOT EXISTS`, so reapplying is a no-op.

use crate::WsdDb;
use crate::error::DatabaseError;

/// `(name, sql)` pairs in application order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../migrations/001_initial.sql"),
)];

impl WsdDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, sql) in MIGRATIONS {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, "schema migration applied");
        }
        Ok(())
    }
}
