//! Session access lease configuration.

use serde::{Deserialize, Serialize};

/// Default lease length in seconds.
const fn default_lease_duration_secs() -> u32 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockConfig {
    /// How long an acquired or renewed lease stays valid without a heartbeat.
    ///
    /// Clients must heartbeat strictly more often than this.
    #[serde(default = "default_lease_duration_secs")]
    pub lease_duration_secs: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lease_duration_secs: default_lease_duration_secs(),
        }
    }
}

impl LockConfig {
    /// Suggested heartbeat interval: a third of the lease, at least one second.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u32 {
        (self.lease_duration_secs / 3).max(1)
    }
}
