//! Checklist store: the per-session set of discovery items.
//!
//! Items are replaced wholesale on generation and afterwards only move
//! between `missing` and `obtained` through the conditional writes below.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use wsd_core::audit_detail::{ChecklistGeneratedDetail, StatusChangedDetail};
use wsd_core::entities::{ChecklistItem, NewChecklistItem};
use wsd_core::enums::{AnalysisMode, AuditAction, Confidence, EntityType, EvidenceSource, ItemStatus};
use wsd_core::ids::PREFIX_ITEM;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, parse_optional_enum,
    to_detail,
};
use crate::repos::audit::record_audit;
use crate::service::{WsdService, finish};

const ITEM_COLUMNS: &str = "id, session_id, item_number, text, importance, category, \
     suggested_question, status, obtained_text, confidence, obtained_source, obtained_at, \
     reset_reason, reset_at, created_at, updated_at";

fn row_to_item(row: &libsql::Row) -> Result<ChecklistItem, DatabaseError> {
    let item = ChecklistItem {
        id: row.get::<String>(0)?,
        session_id: row.get::<String>(1)?,
        item_number: row.get::<i64>(2)?,
        text: row.get::<String>(3)?,
        importance: parse_enum(&row.get::<String>(4)?)?,
        category: row.get::<String>(5)?,
        suggested_question: get_opt_string(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        obtained_text: get_opt_string(row, 8)?,
        confidence: parse_optional_enum(get_opt_string(row, 9)?.as_deref())?,
        obtained_source: parse_optional_enum(get_opt_string(row, 10)?.as_deref())?,
        obtained_at: parse_optional_datetime(get_opt_string(row, 11)?.as_deref())?,
        reset_reason: get_opt_string(row, 12)?,
        reset_at: parse_optional_datetime(get_opt_string(row, 13)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    };
    item.check_invariants()
        .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;
    Ok(item)
}

/// Resolve the `item_number` of each new item: the explicit number when given,
/// its 1-based position otherwise. Numbers must be positive and unique.
fn assign_item_numbers(items: &[NewChecklistItem]) -> Result<Vec<i64>, DatabaseError> {
    let mut seen = HashSet::new();
    let mut numbers = Vec::with_capacity(items.len());
    for (position, item) in (1_i64..).zip(items) {
        if item.text.trim().is_empty() {
            return Err(DatabaseError::InvalidState(format!(
                "checklist item at position {position} has no text"
            )));
        }
        let number = item.item_number.unwrap_or(position);
        if number <= 0 {
            return Err(DatabaseError::InvalidState(format!(
                "item_number must be positive, got {number}"
            )));
        }
        if !seen.insert(number) {
            return Err(DatabaseError::InvalidState(format!(
                "duplicate item_number {number}"
            )));
        }
        numbers.push(number);
    }
    Ok(numbers)
}

async fn replace_in(
    conn: &libsql::Connection,
    session_id: &str,
    items: &[NewChecklistItem],
    numbers: &[i64],
    now: DateTime<Utc>,
) -> Result<Vec<ChecklistItem>, DatabaseError> {
    let replaced = conn
        .execute(
            "DELETE FROM checklist_items WHERE session_id = ?1",
            [session_id],
        )
        .await?;

    let mut created = Vec::with_capacity(items.len());
    for (item, &number) in items.iter().zip(numbers) {
        let id = generate_id(conn, PREFIX_ITEM).await?;
        conn.execute(
            "INSERT INTO checklist_items
                (id, session_id, item_number, text, importance, category, suggested_question,
                 status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'missing', ?8, ?8)",
            libsql::params![
                id.as_str(),
                session_id,
                number,
                item.text.trim(),
                item.importance.as_str(),
                item.category.as_str(),
                item.suggested_question.as_deref(),
                now.to_rfc3339()
            ],
        )
        .await?;
        created.push(ChecklistItem {
            id,
            session_id: session_id.to_string(),
            item_number: number,
            text: item.text.trim().to_string(),
            importance: item.importance,
            category: item.category.clone(),
            suggested_question: item.suggested_question.clone(),
            status: ItemStatus::Missing,
            obtained_text: None,
            confidence: None,
            obtained_source: None,
            obtained_at: None,
            reset_reason: None,
            reset_at: None,
            created_at: now,
            updated_at: now,
        });
    }
    created.sort_by_key(|item| item.item_number);

    let detail = ChecklistGeneratedDetail {
        items: u32::try_from(created.len()).unwrap_or(u32::MAX),
        replaced: u32::try_from(replaced).unwrap_or(u32::MAX),
    };
    record_audit(
        conn,
        session_id,
        EntityType::Checklist,
        session_id,
        AuditAction::ChecklistGenerated,
        Some(to_detail(&detail)?),
        now,
    )
    .await?;

    Ok(created)
}

/// Values written by a successful obtain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObtainWrite<'a> {
    pub item_id: &'a str,
    pub obtained_text: &'a str,
    pub confidence: Confidence,
    pub source: EvidenceSource,
    pub quote: Option<&'a str>,
}

/// `missing -> obtained`, only if the item is still missing.
///
/// Returns whether a row changed. Zero rows means a concurrent batch moved
/// the item first (or it is not in this session).
pub(crate) async fn obtain_if_missing(
    conn: &libsql::Connection,
    session_id: &str,
    write: &ObtainWrite<'_>,
    mode: AnalysisMode,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE checklist_items
             SET status = 'obtained', obtained_text = ?3, confidence = ?4, obtained_source = ?5,
                 obtained_at = ?6, reset_reason = NULL, reset_at = NULL, updated_at = ?6
             WHERE id = ?1 AND session_id = ?2 AND status = 'missing'",
            libsql::params![
                write.item_id,
                session_id,
                write.obtained_text,
                write.confidence.as_str(),
                write.source.as_str(),
                now.to_rfc3339()
            ],
        )
        .await?;
    if changed == 0 {
        return Ok(false);
    }

    let detail = StatusChangedDetail {
        from: ItemStatus::Missing.as_str().into(),
        to: ItemStatus::Obtained.as_str().into(),
        reason: None,
        quote: write.quote.map(String::from),
        mode: mode.as_str().into(),
    };
    record_audit(
        conn,
        session_id,
        EntityType::ChecklistItem,
        write.item_id,
        AuditAction::ItemObtained,
        Some(to_detail(&detail)?),
        now,
    )
    .await?;
    Ok(true)
}

/// `obtained -> missing`, only if the item is still obtained.
///
/// Clears every obtained field and records the reason.
pub(crate) async fn reset_if_obtained(
    conn: &libsql::Connection,
    session_id: &str,
    item_id: &str,
    reason: &str,
    mode: AnalysisMode,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE checklist_items
             SET status = 'missing', obtained_text = NULL, confidence = NULL,
                 obtained_source = NULL, obtained_at = NULL,
                 reset_reason = ?3, reset_at = ?4, updated_at = ?4
             WHERE id = ?1 AND session_id = ?2 AND status = 'obtained'",
            libsql::params![item_id, session_id, reason, now.to_rfc3339()],
        )
        .await?;
    if changed == 0 {
        return Ok(false);
    }

    let detail = StatusChangedDetail {
        from: ItemStatus::Obtained.as_str().into(),
        to: ItemStatus::Missing.as_str().into(),
        reason: Some(reason.to_string()),
        quote: None,
        mode: mode.as_str().into(),
    };
    record_audit(
        conn,
        session_id,
        EntityType::ChecklistItem,
        item_id,
        AuditAction::ItemReset,
        Some(to_detail(&detail)?),
        now,
    )
    .await?;
    Ok(true)
}

pub(crate) async fn count_by_status(
    conn: &libsql::Connection,
    session_id: &str,
    status: ItemStatus,
) -> Result<u32, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COUNT(*) FROM checklist_items WHERE session_id = ?1 AND status = ?2",
            libsql::params![session_id, status.as_str()],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    crate::helpers::get_u32(&row, 0)
}

impl WsdService {
    /// Replace the whole checklist of a session.
    ///
    /// Numbers items 1..n in the given order unless explicit numbers are set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for blank text or bad numbering,
    /// or `DatabaseError` if the transaction fails.
    pub async fn replace_checklist(
        &self,
        session_id: &str,
        items: &[NewChecklistItem],
    ) -> Result<Vec<ChecklistItem>, DatabaseError> {
        let numbers = assign_item_numbers(items)?;
        let now = self.clock().now();

        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = replace_in(&tx, session_id, items, &numbers, now).await;
        let created = finish(tx, result).await?;

        tracing::info!(session_id, items = created.len(), "checklist replaced");
        Ok(created)
    }

    /// List a session's items by `item_number`, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_items(
        &self,
        session_id: &str,
        status: Option<ItemStatus>,
    ) -> Result<Vec<ChecklistItem>, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {ITEM_COLUMNS} FROM checklist_items
                             WHERE session_id = ?1 AND status = ?2 ORDER BY item_number"
                        ),
                        libsql::params![session_id, status.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {ITEM_COLUMNS} FROM checklist_items
                             WHERE session_id = ?1 ORDER BY item_number"
                        ),
                        [session_id],
                    )
                    .await?
            }
        };

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_item(&row)?);
        }
        Ok(items)
    }

    /// Fetch one item by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no item has this ID.
    pub async fn get_item(&self, id: &str) -> Result<ChecklistItem, DatabaseError> {
        let _gate = self.gate().await;
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {ITEM_COLUMNS} FROM checklist_items WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_item(&row)
    }

    /// Count a session's items in `status`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_items_by_status(
        &self,
        session_id: &str,
        status: ItemStatus,
    ) -> Result<u32, DatabaseError> {
        let _gate = self.gate().await;
        count_by_status(self.db().conn(), session_id, status).await
    }
}
