//! Shared test utilities for wsd-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;

    use wsd_config::LockConfig;
    use wsd_core::clock::ManualClock;
    use wsd_core::entities::{ChecklistItem, NewChecklistItem};
    use wsd_core::enums::Importance;

    use crate::WsdDb;
    use crate::service::WsdService;

    /// Create an in-memory WsdService on a manual clock with the given lease.
    pub async fn test_service_with_clock(clock: ManualClock, lease_secs: u32) -> WsdService {
        let db = WsdDb::open_local(":memory:").await.unwrap();
        let lock = LockConfig {
            lease_duration_secs: lease_secs,
        };
        WsdService::from_db(db, Arc::new(clock), &lock)
    }

    /// Create an in-memory WsdService with default lease on a fresh manual clock.
    pub async fn test_service() -> WsdService {
        test_service_with_clock(ManualClock::default(), 120).await
    }

    /// Generate a checklist for `session_id` with one critical item per text.
    pub async fn seed_checklist(
        svc: &WsdService,
        session_id: &str,
        texts: &[&str],
    ) -> Vec<ChecklistItem> {
        let items: Vec<NewChecklistItem> = texts
            .iter()
            .map(|t| NewChecklistItem {
                item_number: None,
                text: (*t).to_string(),
                importance: Importance::Critical,
                category: "general".into(),
                suggested_question: None,
            })
            .collect();
        svc.replace_checklist(session_id, &items).await.unwrap()
    }
}
