//! Per-session analysis queue.
//!
//! Analyses of one session run one at a time in arrival order (tokio's
//! mutex is FIFO); different sessions do not wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
pub struct SessionQueue {
    slots: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for this session's turn. The turn ends when the guard drops.
    pub async fn enter(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Idle slots are referenced only by the map.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(session_id.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of sessions with an analysis running or waiting.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| Arc::strong_count(slot) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_session_waits_other_session_does_not() {
        let queue = SessionQueue::new();
        let held = queue.enter("ses-1").await;

        let other = tokio::time::timeout(Duration::from_millis(100), queue.enter("ses-2")).await;
        assert!(other.is_ok(), "different session must not wait");

        let same = tokio::time::timeout(Duration::from_millis(50), queue.enter("ses-1")).await;
        assert!(same.is_err(), "same session must wait for the holder");

        drop(held);
        let again = tokio::time::timeout(Duration::from_millis(100), queue.enter("ses-1")).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn idle_slots_are_pruned() {
        let queue = SessionQueue::new();
        drop(queue.enter("ses-1").await);
        drop(queue.enter("ses-2").await);
        let _held = queue.enter("ses-3").await;
        assert_eq!(queue.active_sessions(), 1);
        assert_eq!(queue.slots.lock().unwrap().len(), 1);
    }
}
