//! Roster domain model: teams, children and their aggregates.
//!
//! # Invariants
//! - Entities are identified by storage-assigned integer ids.
//! - Deletion is physical; there is no tombstone state.
//! - Age is a derived value, never a persisted field.

pub mod age;
pub mod child;
pub mod stats;
pub mod team;
