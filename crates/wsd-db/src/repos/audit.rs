//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, with dynamic filtering.

use chrono::{DateTime, Utc};

use wsd_core::entities::AuditEntry;
use wsd_core::enums::{AuditAction, EntityType};
use wsd_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::WsdService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub session_id: Option<String>,
    pub limit: Option<u32>,
}

impl AuditFilter {
    /// `WHERE ...` over the set fields (empty when none is set) and its bound values.
    fn where_clause(&self) -> (String, Vec<libsql::Value>) {
        let columns = [
            ("entity_type", self.entity_type.map(|e| e.as_str().to_string())),
            ("entity_id", self.entity_id.clone()),
            ("action", self.action.map(|a| a.as_str().to_string())),
            ("session_id", self.session_id.clone()),
        ];
        let mut values = Vec::new();
        let mut conditions = Vec::new();
        for (column, value) in columns {
            if let Some(value) = value {
                values.push(libsql::Value::Text(value));
                conditions.push(format!("{column} = ?{}", values.len()));
            }
        }
        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

pub(crate) async fn insert_audit(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (id, session_id, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.session_id.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

/// Build and insert an audit entry in one step.
pub(crate) async fn record_audit(
    conn: &libsql::Connection,
    session_id: &str,
    entity_type: EntityType,
    entity_id: &str,
    action: AuditAction,
    detail: Option<serde_json::Value>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let id = generate_id(conn, PREFIX_AUDIT).await?;
    insert_audit(
        conn,
        &AuditEntry {
            id,
            session_id: Some(session_id.to_string()),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: now,
        },
    )
    .await
}

impl WsdService {
    /// Append a standalone audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        let _gate = self.gate().await;
        insert_audit(self.db().conn(), entry).await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let _gate = self.gate().await;
        let (where_clause, params) = filter.where_clause();

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, session_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                session_id: get_opt_string(&row, 1)?,
                entity_type: parse_enum(&row.get::<String>(2)?)?,
                entity_id: row.get::<String>(3)?,
                action: parse_enum(&row.get::<String>(4)?)?,
                detail: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::test_support::helpers::test_service;

    fn entry(i: u32, session: &str, action: AuditAction) -> AuditEntry {
        AuditEntry {
            id: format!("aud-{i:08x}"),
            session_id: Some(session.to_string()),
            entity_type: EntityType::Evidence,
            entity_id: format!("evd-{i:08x}"),
            action,
            detail: Some(json!({"sequence_index": i})),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_and_filter_by_session_and_action() {
        let svc = test_service().await;
        svc.append_audit(&entry(1, "ses-a", AuditAction::EvidenceRecorded))
            .await
            .unwrap();
        svc.append_audit(&entry(2, "ses-a", AuditAction::LockAcquired))
            .await
            .unwrap();
        svc.append_audit(&entry(3, "ses-b", AuditAction::EvidenceRecorded))
            .await
            .unwrap();

        let for_a = svc
            .query_audit(&AuditFilter {
                session_id: Some("ses-a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_a.len(), 2);

        let evidence_a = svc
            .query_audit(&AuditFilter {
                session_id: Some("ses-a".into()),
                action: Some(AuditAction::EvidenceRecorded),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(evidence_a.len(), 1);
        assert_eq!(evidence_a[0].detail, Some(json!({"sequence_index": 1})));
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let svc = test_service().await;
        for i in 0..5 {
            svc.append_audit(&entry(i, "ses-a", AuditAction::FindingRecorded))
                .await
                .unwrap();
        }
        let entries = svc
            .query_audit(&AuditFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn where_clause_numbers_only_the_set_fields() {
        let (clause, values) = AuditFilter {
            action: Some(AuditAction::LockTakenOver),
            session_id: Some("ses-a".into()),
            ..Default::default()
        }
        .where_clause();
        assert_eq!(clause, "WHERE action = ?1 AND session_id = ?2");
        assert_eq!(values.len(), 2);

        let (empty, none) = AuditFilter::default().where_clause();
        assert!(empty.is_empty());
        assert!(none.is_empty());
    }
}
