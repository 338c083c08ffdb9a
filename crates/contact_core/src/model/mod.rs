//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted `Contact` record and its write-side candidate.
//! - Define transient command shapes carried from the HTTP surface.
//!
//! # Invariants
//! - Every contact is identified by a stable, store-assigned `ContactId`.
//! - `name` is unique across all contacts at any time.

pub mod command;
pub mod contact;
