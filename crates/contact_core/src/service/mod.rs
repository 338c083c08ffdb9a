//! Contact workflows.
//!
//! # Responsibility
//! - Orchestrate validation, store mutation and flash notices per use case.
//! - Keep the HTTP layer decoupled from storage details.

pub mod contact_service;
