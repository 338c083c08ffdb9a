//! Core domain logic for the contact book.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod flash;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use flash::{FlashScope, FlashStore, SessionId, CATEGORY_ERROR, CATEGORY_SUCCESS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::command::{ContactCommand, ContactField, DeleteCommand, FieldError, Intent};
pub use model::contact::{Contact, ContactId, NewContact};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::{
    ContactListView, ContactService, DeleteOutcome, MutationOutcome, ServiceError, ServiceResult,
};
pub use validation::{is_valid_email, is_valid_mobile_phone, validate_contact};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
