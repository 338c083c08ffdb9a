//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the Contact Store contract used by workflows.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`) in
//!   addition to DB transport errors.
//! - Name uniqueness is enforced by storage; validation only pre-checks it.

pub mod contact_repo;
