//! # wsd-db
//!
//! libSQL persistence for workshop discovery.
//!
//! Holds the relational state of every discovery session: the checklist,
//! the append-only evidence and findings ledgers, the session lease,
//! reanalysis summaries and the audit trail. Callers go through
//! [`service::WsdService`]; the SQL stays inside the repo modules.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and its single shared connection.
pub struct WsdDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl WsdDb {
    /// Open a local database at the given path, or `":memory:"`.
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

        let wsd_db = Self { db, conn };
        wsd_db.run_migrations().await?;
        Ok(wsd_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"fnd-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on an arbitrary connection (or open transaction).
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
pub(crate) async fn generate_id(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use wsd_core::ids::{PREFIX_EVIDENCE, PREFIX_ITEM, has_prefix};

    async fn test_db() -> WsdDb {
        WsdDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "checklist_items",
            "evidence_records",
            "findings",
            "session_locks",
            "reanalysis_runs",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_uses_prefix_and_is_unique() {
        let db = test_db().await;
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let id = db.generate_id(PREFIX_ITEM).await.unwrap();
            assert!(has_prefix(&id, PREFIX_ITEM), "bad id {id}");
            assert_eq!(id.len(), PREFIX_ITEM.len() + 1 + 8);
            assert!(seen.insert(id));
        }
        let evd = db.generate_id(PREFIX_EVIDENCE).await.unwrap();
        assert!(evd.starts_with("evd-"));
    }

    #[tokio::test]
    async fn migrations_rerun_on_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("discovery.db");
        let path = path.to_str().unwrap();

        {
            let db = WsdDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO session_locks (session_id, holder_id, acquired_at_ms, lease_secs)
                     VALUES ('ses-1', 'alice', 0, 120)",
                    (),
                )
                .await
                .unwrap();
        }

        let db = WsdDb::open_local(path).await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT holder_id FROM session_locks", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "alice");
    }
}
