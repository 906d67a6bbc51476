//! # wsd-core
//!
//! Core types, ID prefixes, and error types for workshop discovery.
//!
//! This crate provides the foundational types shared across all `wsd` crates:
//! - Entity structs for checklist items, evidence, findings, locks, and audit
//! - Status enums with the checklist state machine
//! - ID prefix constants
//! - An injectable clock so lease validity can be tested deterministically
//! - Cross-cutting error types
//! - Audit detail sub-types and engine response types

pub mod audit_detail;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
