//! Errors raised by checks on core types.
//!
//! Store, lock, interpreter and engine failures have their own error types
//! in `wsd-db`, `wsd-interpreter` and `wsd-engine`.

use thiserror::Error;

use crate::enums::ItemStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The obtained fields of an item disagree with its status.
    #[error("checklist item {item_id} is {status} but has obtained fields {present:?}")]
    InconsistentItem {
        item_id: String,
        status: ItemStatus,
        /// Whether text, confidence, source and timestamp are set, in that order.
        present: [bool; 4],
    },
}
