//! Repository modules implementing the persistence operations.
//!
//! Each module adds methods to `WsdService` via `impl WsdService` blocks.
//! Statements that must run inside a caller's transaction are free
//! functions taking a `&libsql::Connection`.

pub mod audit;
pub mod batch;
pub mod checklist;
pub mod evidence;
pub mod finding;
pub mod lock;
pub mod reanalysis;
