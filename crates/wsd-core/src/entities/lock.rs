use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Exclusive-access lease on a session.
///
/// Validity is derived from `acquired_at` and the lease length on every
/// check; nothing marks a record as released except deleting it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionLock {
    pub session_id: String,
    pub holder_id: String,
    pub acquired_at: DateTime<Utc>,
    pub lease_duration_secs: i64,
}

impl SessionLock {
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.acquired_at + Duration::seconds(self.lease_duration_secs)
    }

    /// `now - acquired_at < lease`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    #[must_use]
    pub fn is_held_by(&self, holder_id: &str) -> bool {
        self.holder_id == holder_id
    }

    #[must_use]
    pub fn token(&self) -> LockToken {
        LockToken {
            session_id: self.session_id.clone(),
            holder_id: self.holder_id.clone(),
            acquired_at: self.acquired_at,
            expires_at: self.expires_at(),
        }
    }
}

/// Issued on a successful acquire or heartbeat and presented on every
/// mutating call for the session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LockToken {
    pub session_id: String,
    pub holder_id: String,
    pub acquired_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
