//! Reanalysis run summaries.

use wsd_core::entities::ReanalysisRun;

use crate::error::DatabaseError;
use crate::helpers::{get_u32, parse_datetime, parse_enum};
use crate::service::WsdService;

const RUN_COLUMNS: &str = "id, session_id, obtained, reset, missing, findings_recorded, dropped, \
     evidence_records, corpus_chars, truncated, interpreter_status, created_at";

fn row_to_run(row: &libsql::Row) -> Result<ReanalysisRun, DatabaseError> {
    let corpus_chars = row.get::<i64>(8)?;
    Ok(ReanalysisRun {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        obtained: get_u32(row, 2)?,
        reset: get_u32(row, 3)?,
        missing: get_u32(row, 4)?,
        findings_recorded: get_u32(row, 5)?,
        dropped: get_u32(row, 6)?,
        evidence_records: get_u32(row, 7)?,
        corpus_chars: u64::try_from(corpus_chars)
            .map_err(|_| DatabaseError::Query(format!("negative corpus_chars: {corpus_chars}")))?,
        truncated: row.get::<i64>(9)? != 0,
        interpreter_status: parse_enum(&row.get::<String>(10)?)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

pub(crate) async fn insert_run(
    conn: &libsql::Connection,
    run: &ReanalysisRun,
) -> Result<(), DatabaseError> {
    let corpus_chars = i64::try_from(run.corpus_chars)
        .map_err(|_| DatabaseError::InvalidState(format!("corpus too large: {}", run.corpus_chars)))?;
    conn.execute(
        &format!("INSERT INTO reanalysis_runs ({RUN_COLUMNS})
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"),
        libsql::params![
            run.id.as_str(),
            run.session_id.as_str(),
            i64::from(run.obtained),
            i64::from(run.reset),
            i64::from(run.missing),
            i64::from(run.findings_recorded),
            i64::from(run.dropped),
            i64::from(run.evidence_records),
            corpus_chars,
            i64::from(run.truncated),
            run.interpreter_status.as_str(),
            run.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl WsdService {
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no run has this ID.
    pub async fn get_reanalysis_run(&self, id: &str) -> Result<ReanalysisRun, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {RUN_COLUMNS} FROM reanalysis_runs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_run(&row)
    }

    /// Runs of a session, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_reanalysis_runs(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<ReanalysisRun>, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RUN_COLUMNS} FROM reanalysis_runs
                     WHERE session_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                ),
                libsql::params![session_id, i64::from(limit)],
            )
            .await?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next().await? {
            runs.push(row_to_run(&row)?);
        }
        Ok(runs)
    }
}
