pub mod audit;
pub mod checklist;
pub mod dispatch;
pub mod evidence;
pub mod finding;
pub mod lock;
pub mod reanalyze;
pub mod shared;
