//! Session access lock: a single-holder lease per session.
//!
//! Expiry is never swept; every operation recomputes it from the stored
//! `acquired_at_ms` and `lease_secs` against the injected clock.

use chrono::{DateTime, Utc};

use wsd_core::audit_detail::LockDetail;
use wsd_core::entities::{LockToken, SessionLock};
use wsd_core::enums::{AuditAction, EntityType};

use crate::error::{DatabaseError, LockError};
use crate::helpers::{datetime_from_millis, to_detail};
use crate::repos::audit::record_audit;
use crate::service::{WsdService, finish};

fn row_to_lock(row: &libsql::Row) -> Result<SessionLock, DatabaseError> {
    Ok(SessionLock {
        session_id: row.get::<String>(0)?,
        holder_id: row.get::<String>(1)?,
        acquired_at: datetime_from_millis(row.get::<i64>(2)?)?,
        lease_duration_secs: row.get::<i64>(3)?,
    })
}

async fn read_lock(
    conn: &libsql::Connection,
    session_id: &str,
) -> Result<Option<SessionLock>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT session_id, holder_id, acquired_at_ms, lease_secs
             FROM session_locks WHERE session_id = ?1",
            [session_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_lock(&row)?)),
        None => Ok(None),
    }
}

async fn acquire_in(
    conn: &libsql::Connection,
    session_id: &str,
    holder_id: &str,
    lease_secs: i64,
    now: DateTime<Utc>,
) -> Result<LockToken, LockError> {
    let previous = read_lock(conn, session_id).await?;
    let now_ms = now.timestamp_millis();

    // Insert when absent; overwrite only our own lease or an expired one.
    let changed = conn
        .execute(
            "INSERT INTO session_locks (session_id, holder_id, acquired_at_ms, lease_secs)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (session_id) DO UPDATE SET
                 holder_id = excluded.holder_id,
                 acquired_at_ms = excluded.acquired_at_ms,
                 lease_secs = excluded.lease_secs
             WHERE session_locks.holder_id = excluded.holder_id
                OR session_locks.acquired_at_ms + session_locks.lease_secs * 1000
                   <= excluded.acquired_at_ms",
            libsql::params![session_id, holder_id, now_ms, lease_secs],
        )
        .await?;

    if changed == 0 {
        let current = read_lock(conn, session_id)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        return Err(LockError::Conflict {
            session_id: session_id.to_string(),
            holder_id: current.holder_id.clone(),
            expires_at: current.expires_at(),
        });
    }

    let previous_holder = previous
        .map(|lock| lock.holder_id)
        .filter(|prev| prev != holder_id);
    let action = if previous_holder.is_some() {
        AuditAction::LockTakenOver
    } else {
        AuditAction::LockAcquired
    };
    let detail = LockDetail {
        holder_id: holder_id.to_string(),
        previous_holder,
        lease_duration_secs: lease_secs,
    };
    record_audit(
        conn,
        session_id,
        EntityType::SessionLock,
        session_id,
        action,
        Some(to_detail(&detail)?),
        now,
    )
    .await?;

    let lock = SessionLock {
        session_id: session_id.to_string(),
        holder_id: holder_id.to_string(),
        acquired_at: datetime_from_millis(now_ms)?,
        lease_duration_secs: lease_secs,
    };
    Ok(lock.token())
}

impl WsdService {
    /// Acquire (or re-acquire) the session lease for `holder_id`.
    ///
    /// Never blocks or queues: a live lease held by someone else is an
    /// immediate `LockError::Conflict` naming the holder and expiry.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Conflict` or `LockError::Database`.
    pub async fn acquire_lock(
        &self,
        session_id: &str,
        holder_id: &str,
    ) -> Result<LockToken, LockError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = acquire_in(&tx, session_id, holder_id, self.lease_duration_secs(), now).await;
        let token = finish(tx, result).await?;

        tracing::info!(session_id, holder_id, expires_at = %token.expires_at, "lock acquired");
        Ok(token)
    }

    /// Extend the lease of the current holder.
    ///
    /// A lapsed lease nobody reclaimed is still ours and gets renewed.
    ///
    /// # Errors
    ///
    /// Returns `LockError::NotHolder` if another holder (or nobody) has the lock.
    pub async fn heartbeat_lock(
        &self,
        session_id: &str,
        holder_id: &str,
    ) -> Result<LockToken, LockError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let conn = self.db().conn();

        let changed = conn
            .execute(
                "UPDATE session_locks SET acquired_at_ms = ?3
                 WHERE session_id = ?1 AND holder_id = ?2",
                libsql::params![session_id, holder_id, now.timestamp_millis()],
            )
            .await?;
        if changed == 0 {
            return Err(LockError::NotHolder {
                session_id: session_id.to_string(),
                holder_id: holder_id.to_string(),
            });
        }

        let lock = read_lock(conn, session_id)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        tracing::debug!(session_id, holder_id, "lock heartbeat");
        Ok(lock.token())
    }

    /// Release the lease. A release by a non-holder is a silent no-op.
    ///
    /// Returns whether a lock was removed.
    ///
    /// # Errors
    ///
    /// Returns `LockError::Database` if the transaction fails.
    pub async fn release_lock(&self, session_id: &str, holder_id: &str) -> Result<bool, LockError> {
        let now = self.clock().now();
        let _gate = self.gate().await;
        let tx = self.db().conn().transaction().await?;
        let result = async {
            let deleted = tx
                .execute(
                    "DELETE FROM session_locks WHERE session_id = ?1 AND holder_id = ?2",
                    libsql::params![session_id, holder_id],
                )
                .await?;
            if deleted > 0 {
                let detail = LockDetail {
                    holder_id: holder_id.to_string(),
                    previous_holder: None,
                    lease_duration_secs: self.lease_duration_secs(),
                };
                record_audit(
                    &tx,
                    session_id,
                    EntityType::SessionLock,
                    session_id,
                    AuditAction::LockReleased,
                    Some(to_detail(&detail)?),
                    now,
                )
                .await?;
            }
            Ok::<bool, LockError>(deleted > 0)
        }
        .await;
        let released = finish(tx, result).await?;

        if released {
            tracing::info!(session_id, holder_id, "lock released");
        }
        Ok(released)
    }

    /// The stored lock record, expired or not.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn current_lock(&self, session_id: &str) -> Result<Option<SessionLock>, DatabaseError> {
        let _gate = self.gate().await;
        read_lock(self.db().conn(), session_id).await
    }

    /// Check that `token` still names the holder of a live lease.
    ///
    /// # Errors
    ///
    /// Returns `LockError::NotHolder` when the holder differs or the lease lapsed.
    pub async fn require_holder(&self, token: &LockToken) -> Result<SessionLock, LockError> {
        let now = self.clock().now();
        match self.current_lock(&token.session_id).await? {
            Some(lock) if lock.is_held_by(&token.holder_id) && lock.is_valid_at(now) => Ok(lock),
            _ => Err(LockError::NotHolder {
                session_id: token.session_id.clone(),
                holder_id: token.holder_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use wsd_core::clock::{Clock, ManualClock};

    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service_with_clock;

    #[tokio::test]
    async fn acquire_on_free_session_returns_token() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 120).await;

        let token = svc.acquire_lock("ses-1", "alice").await.unwrap();
        assert_eq!(token.holder_id, "alice");
        assert_eq!(token.expires_at - token.acquired_at, Duration::seconds(120));

        let lock = svc.current_lock("ses-1").await.unwrap().unwrap();
        assert!(lock.is_valid_at(clock.now()));
    }

    #[tokio::test]
    async fn second_holder_gets_conflict_with_expiry() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 120).await;
        let token = svc.acquire_lock("ses-1", "alice").await.unwrap();

        let err = svc.acquire_lock("ses-1", "bob").await.unwrap_err();
        match err {
            LockError::Conflict {
                holder_id,
                expires_at,
                ..
            } => {
                assert_eq!(holder_id, "alice");
                assert_eq!(expires_at, token.expires_at);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_holder_reacquire_extends_lease() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 120).await;
        let first = svc.acquire_lock("ses-1", "alice").await.unwrap();
        clock.advance(Duration::seconds(60));
        let second = svc.acquire_lock("ses-1", "alice").await.unwrap();
        assert!(second.expires_at > first.expires_at);
    }

    #[tokio::test]
    async fn expired_lease_is_taken_over_and_audited() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 2).await;
        let alice = svc.acquire_lock("ses-1", "alice").await.unwrap();

        clock.advance(Duration::seconds(3));
        let bob = svc.acquire_lock("ses-1", "bob").await.unwrap();
        assert_eq!(bob.holder_id, "bob");

        assert!(matches!(
            svc.require_holder(&alice).await,
            Err(LockError::NotHolder { .. })
        ));
        assert!(matches!(
            svc.heartbeat_lock("ses-1", "alice").await,
            Err(LockError::NotHolder { .. })
        ));

        let audit = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::LockTakenOver),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].detail.as_ref().unwrap()["previous_holder"], "alice");
    }

    #[tokio::test]
    async fn lease_still_live_one_millisecond_before_expiry() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 2).await;
        svc.acquire_lock("ses-1", "alice").await.unwrap();
        clock.advance(Duration::milliseconds(1999));
        assert!(matches!(
            svc.acquire_lock("ses-1", "bob").await,
            Err(LockError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn heartbeat_renews_and_rejects_non_holder() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 10).await;
        let first = svc.acquire_lock("ses-1", "alice").await.unwrap();

        clock.advance(Duration::seconds(8));
        let renewed = svc.heartbeat_lock("ses-1", "alice").await.unwrap();
        assert_eq!(renewed.expires_at, first.expires_at + Duration::seconds(8));

        clock.advance(Duration::seconds(8));
        assert!(svc.require_holder(&renewed).await.is_ok());

        assert!(matches!(
            svc.heartbeat_lock("ses-1", "bob").await,
            Err(LockError::NotHolder { .. })
        ));
        assert!(matches!(
            svc.heartbeat_lock("ses-2", "alice").await,
            Err(LockError::NotHolder { .. })
        ));
    }

    #[tokio::test]
    async fn heartbeat_revives_lapsed_unclaimed_lease() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock.clone(), 2).await;
        svc.acquire_lock("ses-1", "alice").await.unwrap();
        clock.advance(Duration::seconds(5));
        let token = svc.heartbeat_lock("ses-1", "alice").await.unwrap();
        assert!(svc.require_holder(&token).await.is_ok());
    }

    #[tokio::test]
    async fn release_by_non_holder_is_noop() {
        let clock = ManualClock::default();
        let svc = test_service_with_clock(clock, 120).await;
        svc.acquire_lock("ses-1", "alice").await.unwrap();

        assert!(!svc.release_lock("ses-1", "bob").await.unwrap());
        assert!(svc.current_lock("ses-1").await.unwrap().is_some());

        assert!(svc.release_lock("ses-1", "alice").await.unwrap());
        assert!(svc.current_lock("ses-1").await.unwrap().is_none());
        assert!(!svc.release_lock("ses-1", "alice").await.unwrap());

        svc.acquire_lock("ses-1", "bob").await.unwrap();
    }

    #[tokio::test]
    async fn locks_are_per_session() {
        let svc = test_service_with_clock(ManualClock::default(), 120).await;
        svc.acquire_lock("ses-1", "alice").await.unwrap();
        svc.acquire_lock("ses-2", "bob").await.unwrap();
    }
}
