//! Entity structs for all discovery domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `wsd-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON output and schema validation.

mod audit;
mod checklist;
mod evidence;
mod finding;
mod lock;
mod reanalysis;

pub use audit::AuditEntry;
pub use checklist::{ChecklistItem, NewChecklistItem};
pub use evidence::EvidenceRecord;
pub use finding::{Finding, NewFinding};
pub use lock::{LockToken, SessionLock};
pub use reanalysis::ReanalysisRun;
