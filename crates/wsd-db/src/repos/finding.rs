//! Findings ledger: append-only risks and observations.
//!
//! The only removal path is the explicit operator delete.

use chrono::{DateTime, Utc};
use serde_json::json;

use wsd_core::entities::{Finding, NewFinding};
use wsd_core::enums::{AuditAction, EntityType};
use wsd_core::ids::PREFIX_FINDING;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::audit::record_audit;
use crate::service::{WsdService, finish};

const FINDING_COLUMNS: &str = "id, session_id, evidence_id, reanalysis_id, topic, finding_type, \
     risk_level, details, recommendation, source_quote, created_at";

fn row_to_finding(row: &libsql::Row) -> Result<Finding, DatabaseError> {
    Ok(Finding {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        evidence_id: get_opt_string(row, 2)?,
        reanalysis_id: get_opt_string(row, 3)?,
        topic: row.get::<String>(4)?,
        finding_type: row.get::<String>(5)?,
        risk_level: parse_enum(&row.get::<String>(6)?)?,
        details: row.get::<String>(7)?,
        recommendation: get_opt_string(row, 8)?,
        source_quote: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

/// Where a finding came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindingOrigin<'a> {
    pub evidence_id: Option<&'a str>,
    pub reanalysis_id: Option<&'a str>,
}

pub(crate) async fn insert_finding(
    conn: &libsql::Connection,
    session_id: &str,
    origin: FindingOrigin<'_>,
    new: &NewFinding,
    now: DateTime<Utc>,
) -> Result<Finding, DatabaseError> {
    let id = generate_id(conn, PREFIX_FINDING).await?;
    conn.execute(
        "INSERT INTO findings (id, session_id, evidence_id, reanalysis_id, topic, finding_type,
                               risk_level, details, recommendation, source_quote, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        libsql::params![
            id.as_str(),
            session_id,
            origin.evidence_id,
            origin.reanalysis_id,
            new.topic.as_str(),
            new.finding_type.as_str(),
            new.risk_level.as_str(),
            new.details.as_str(),
            new.recommendation.as_deref(),
            new.source_quote.as_deref(),
            now.to_rfc3339()
        ],
    )
    .await?;

    record_audit(
        conn,
        session_id,
        EntityType::Finding,
        &id,
        AuditAction::FindingRecorded,
        Some(json!({
            "risk_level": new.risk_level.as_str(),
            "evidence_id": origin.evidence_id,
            "reanalysis_id": origin.reanalysis_id,
        })),
        now,
    )
    .await?;

    Ok(Finding {
        id,
        session_id: session_id.to_string(),
        evidence_id: origin.evidence_id.map(String::from),
        reanalysis_id: origin.reanalysis_id.map(String::from),
        topic: new.topic.clone(),
        finding_type: new.finding_type.clone(),
        risk_level: new.risk_level,
        details: new.details.clone(),
        recommendation: new.recommendation.clone(),
        source_quote: new.source_quote.clone(),
        created_at: now,
    })
}

impl WsdService {
    /// Append a single finding outside an analysis batch.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction fails (e.g., unknown evidence ID).
    pub async fn append_finding(
        &self,
        session_id: &str,
        origin: FindingOrigin<'_>,
        new: &NewFinding,
    ) -> Result<Finding, DatabaseError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = insert_finding(&tx, session_id, origin, new, now).await;
        finish(tx, result).await
    }

    /// Findings of a session in recording order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_findings(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<Finding>, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {FINDING_COLUMNS} FROM findings
                     WHERE session_id = ?1 ORDER BY created_at, rowid LIMIT ?2"
                ),
                libsql::params![session_id, i64::from(limit)],
            )
            .await?;
        let mut findings = Vec::new();
        while let Some(row) = rows.next().await? {
            findings.push(row_to_finding(&row)?);
        }
        Ok(findings)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no finding has this ID.
    pub async fn get_finding(&self, id: &str) -> Result<Finding, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {FINDING_COLUMNS} FROM findings WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_finding(&row)
    }

    /// Operator delete. Returns the removed finding.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no finding has this ID.
    pub async fn delete_finding(&self, id: &str) -> Result<Finding, DatabaseError> {
        let finding = self.get_finding(id).await?;
        let now = self.clock().now();

        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = async {
            let deleted = tx.execute("DELETE FROM findings WHERE id = ?1", [id]).await?;
            if deleted == 0 {
                return Err(DatabaseError::NoResult);
            }
            record_audit(
                &tx,
                &finding.session_id,
                EntityType::Finding,
                id,
                AuditAction::FindingDeleted,
                Some(json!({ "topic": finding.topic })),
                now,
            )
            .await
        }
        .await;
        finish(tx, result).await?;

        tracing::info!(finding_id = id, session_id = %finding.session_id, "finding deleted");
        Ok(finding)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wsd_core::enums::{EvidenceSource, RiskLevel};

    use super::*;
    use crate::test_support::helpers::test_service;

    fn risk(topic: &str) -> NewFinding {
        NewFinding {
            topic: topic.into(),
            finding_type: "integration_risk".into(),
            risk_level: RiskLevel::High,
            details: format!("{topic} details"),
            recommendation: None,
            source_quote: Some("we export to Excel".into()),
        }
    }

    #[tokio::test]
    async fn identical_findings_are_both_kept() {
        let svc = test_service().await;
        let evd = svc
            .append_evidence("ses-a", "we export to Excel", EvidenceSource::Recording)
            .await
            .unwrap();
        let origin = FindingOrigin {
            evidence_id: Some(&evd.id),
            reanalysis_id: None,
        };
        svc.append_finding("ses-a", origin, &risk("ERP")).await.unwrap();
        svc.append_finding("ses-a", origin, &risk("ERP")).await.unwrap();

        let findings = svc.list_findings("ses-a", 20).await.unwrap();
        assert_eq!(findings.len(), 2);
        assert_ne!(findings[0].id, findings[1].id);
        assert_eq!(findings[0].evidence_id.as_deref(), Some(evd.id.as_str()));
    }

    #[tokio::test]
    async fn finding_must_reference_existing_evidence() {
        let svc = test_service().await;
        let origin = FindingOrigin {
            evidence_id: Some("evd-00000000"),
            reanalysis_id: None,
        };
        assert!(svc.append_finding("ses-a", origin, &risk("ERP")).await.is_err());
        assert!(svc.list_findings("ses-a", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let svc = test_service().await;
        let keep = svc
            .append_finding("ses-a", FindingOrigin::default(), &risk("Fleet"))
            .await
            .unwrap();
        let drop = svc
            .append_finding("ses-a", FindingOrigin::default(), &risk("ERP"))
            .await
            .unwrap();

        let removed = svc.delete_finding(&drop.id).await.unwrap();
        assert_eq!(removed, drop);
        assert_eq!(svc.list_findings("ses-a", 20).await.unwrap(), vec![keep]);
        assert!(matches!(
            svc.delete_finding(&drop.id).await,
            Err(DatabaseError::NoResult)
        ));
    }
}
