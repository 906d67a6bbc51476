//! Evidence ledger: append-only, strictly ordered per session.

use chrono::{DateTime, Utc};
use serde_json::json;

use wsd_core::entities::EvidenceRecord;
use wsd_core::enums::{AuditAction, EntityType, EvidenceSource};
use wsd_core::ids::PREFIX_EVIDENCE;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_u32, parse_datetime, parse_enum};
use crate::repos::audit::record_audit;
use crate::service::{WsdService, finish};

const EVIDENCE_COLUMNS: &str = "id, session_id, sequence_index, source, raw_text, processed_at";

fn row_to_evidence(row: &libsql::Row) -> Result<EvidenceRecord, DatabaseError> {
    Ok(EvidenceRecord {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        sequence_index: row.get::<i64>(2)?,
        source: parse_enum(&row.get::<String>(3)?)?,
        raw_text: row.get::<String>(4)?,
        processed_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Insert the next record of the session's ledger and audit it.
///
/// The sequence index is computed by the INSERT itself; the unique
/// `(session_id, sequence_index)` index rejects a duplicate.
pub(crate) async fn insert_evidence(
    conn: &libsql::Connection,
    session_id: &str,
    raw_text: &str,
    source: EvidenceSource,
    now: DateTime<Utc>,
) -> Result<EvidenceRecord, DatabaseError> {
    let id = generate_id(conn, PREFIX_EVIDENCE).await?;
    conn.execute(
        "INSERT INTO evidence_records (id, session_id, sequence_index, source, raw_text, processed_at)
         SELECT ?1, ?2, COALESCE(MAX(sequence_index), 0) + 1, ?3, ?4, ?5
         FROM evidence_records WHERE session_id = ?2",
        libsql::params![id.as_str(), session_id, source.as_str(), raw_text, now.to_rfc3339()],
    )
    .await?;

    let mut rows = conn
        .query(
            "SELECT sequence_index FROM evidence_records WHERE id = ?1",
            [id.as_str()],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let sequence_index = row.get::<i64>(0)?;

    record_audit(
        conn,
        session_id,
        EntityType::Evidence,
        &id,
        AuditAction::EvidenceRecorded,
        Some(json!({
            "sequence_index": sequence_index,
            "source": source.as_str(),
            "chars": raw_text.chars().count(),
        })),
        now,
    )
    .await?;

    Ok(EvidenceRecord {
        id,
        session_id: session_id.to_string(),
        sequence_index,
        source,
        raw_text: raw_text.to_string(),
        processed_at: now,
    })
}

impl WsdService {
    /// Append a record to the session's evidence ledger.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction fails.
    pub async fn append_evidence(
        &self,
        session_id: &str,
        raw_text: &str,
        source: EvidenceSource,
    ) -> Result<EvidenceRecord, DatabaseError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = insert_evidence(&tx, session_id, raw_text, source, now).await;
        finish(tx, result).await
    }

    /// The whole ledger of a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_evidence(&self, session_id: &str) -> Result<Vec<EvidenceRecord>, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {EVIDENCE_COLUMNS} FROM evidence_records
                     WHERE session_id = ?1 ORDER BY sequence_index"
                ),
                [session_id],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_evidence(&row)?);
        }
        Ok(records)
    }

    /// The newest `n` records of a session, returned oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn recent_evidence(
        &self,
        session_id: &str,
        n: u32,
    ) -> Result<Vec<EvidenceRecord>, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {EVIDENCE_COLUMNS} FROM evidence_records
                     WHERE session_id = ?1 ORDER BY sequence_index DESC LIMIT ?2"
                ),
                libsql::params![session_id, i64::from(n)],
            )
            .await?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(row_to_evidence(&row)?);
        }
        records.reverse();
        Ok(records)
    }

    /// Fetch one record by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record has this ID.
    pub async fn get_evidence(&self, id: &str) -> Result<EvidenceRecord, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {EVIDENCE_COLUMNS} FROM evidence_records WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_evidence(&row)
    }

    /// Number of records in a session's ledger.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_evidence(&self, session_id: &str) -> Result<u32, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM evidence_records WHERE session_id = ?1",
                [session_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_u32(&row, 0)
    }
}
