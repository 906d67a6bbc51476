mod checklist;
mod evidence;
mod finding;
mod lock;

pub use checklist::ChecklistCommands;
pub use evidence::{EvidenceCommands, SubmitArgs};
pub use finding::FindingCommands;
pub use lock::LockCommands;
