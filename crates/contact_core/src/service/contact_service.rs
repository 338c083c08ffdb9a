//! Contact use-case service.
//!
//! # Responsibility
//! - Run the add/edit/delete workflows and the list/detail reads.
//! - Convert store-level conflicts into user-facing field errors.
//!
//! # Invariants
//! - Rejected commands never reach the store.
//! - Every successful mutation enqueues exactly one `success` notice.
//! - Not-found on edit/delete is reported, never silently treated as success.

use crate::flash::{FlashScope, CATEGORY_ERROR, CATEGORY_SUCCESS};
use crate::model::command::{ContactCommand, ContactField, DeleteCommand, FieldError, Intent};
use crate::model::contact::Contact;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use crate::validation::{validate_contact, MSG_NAME_TAKEN};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub const MSG_CONTACT_ADDED: &str = "Contact added";
pub const MSG_CONTACT_UPDATED: &str = "Contact updated";
pub const MSG_CONTACT_DELETED: &str = "Contact deleted";
pub const MSG_CONTACT_GONE: &str = "Contact no longer exists";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Workflow failure that is not the user's fault.
#[derive(Debug)]
pub enum ServiceError {
    /// Store transport or data failure.
    Storage(RepoError),
    /// The workflow did not finish within the store time budget.
    StorageTimeout { timeout_ms: u64 },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "contact storage unavailable: {err}"),
            Self::StorageTimeout { timeout_ms } => {
                write!(f, "contact storage timed out after {timeout_ms} ms")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::StorageTimeout { .. } => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Terminal state of an add or edit workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Stored; a success notice was queued.
    Completed(Contact),
    /// Nothing stored; redisplay the form with these errors.
    Rejected(Vec<FieldError>),
}

impl MutationOutcome {
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Completed(_) => &[],
            Self::Rejected(errors) => errors,
        }
    }
}

/// Terminal state of a delete workflow. Both redirect to the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyGone,
}

/// Data needed to render the contact list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactListView {
    pub contacts: Vec<Contact>,
    pub success: Vec<String>,
    pub errors: Vec<String>,
}

/// Workflow facade over a Contact Store implementation.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists every contact and drains pending notices for this session.
    pub fn list_contacts(&self, flash: &FlashScope<'_>) -> ServiceResult<ContactListView> {
        let contacts = self.repo.find_all()?;
        Ok(ContactListView {
            contacts,
            success: flash.drain(CATEGORY_SUCCESS),
            errors: flash.drain(CATEGORY_ERROR),
        })
    }

    /// Looks up one contact by its unique name.
    pub fn find_contact(&self, name: &str) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.find_by_name(name)?)
    }

    /// Add workflow: validate, insert, notify.
    pub fn add_contact(
        &self,
        command: &ContactCommand,
        flash: &FlashScope<'_>,
    ) -> ServiceResult<MutationOutcome> {
        let started_at = Instant::now();
        let errors = validate_contact(&self.repo, command, Intent::Add)?;
        if !errors.is_empty() {
            log_rejected("contact_add", &errors, started_at);
            return Ok(MutationOutcome::Rejected(errors));
        }

        match self.repo.insert(&command.to_new_contact()) {
            Ok(contact) => {
                flash.enqueue(CATEGORY_SUCCESS, MSG_CONTACT_ADDED);
                info!(
                    "event=contact_add module=service status=ok contact_id={} duration_ms={}",
                    contact.id,
                    started_at.elapsed().as_millis()
                );
                Ok(MutationOutcome::Completed(contact))
            }
            Err(RepoError::DuplicateName(_)) => {
                let errors = vec![name_taken()];
                log_rejected("contact_add", &errors, started_at);
                Ok(MutationOutcome::Rejected(errors))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Edit workflow: validate, replace fields by id, notify.
    pub fn edit_contact(
        &self,
        command: &ContactCommand,
        flash: &FlashScope<'_>,
    ) -> ServiceResult<MutationOutcome> {
        let started_at = Instant::now();
        let mut errors = validate_contact(&self.repo, command, Intent::Edit)?;
        let id = command.parsed_id();
        if id.is_none() {
            errors.insert(0, contact_gone());
        }
        let Some(id) = id.filter(|_| errors.is_empty()) else {
            log_rejected("contact_edit", &errors, started_at);
            return Ok(MutationOutcome::Rejected(errors));
        };

        let fields = command.to_new_contact();
        let errors = match self.repo.update_by_id(id, &fields) {
            Ok(()) => {
                flash.enqueue(CATEGORY_SUCCESS, MSG_CONTACT_UPDATED);
                info!(
                    "event=contact_edit module=service status=ok contact_id={id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(MutationOutcome::Completed(fields.with_id(id)));
            }
            Err(RepoError::NotFound(_)) => vec![contact_gone()],
            Err(RepoError::DuplicateName(_)) => vec![name_taken()],
            Err(err) => return Err(err.into()),
        };
        log_rejected("contact_edit", &errors, started_at);
        Ok(MutationOutcome::Rejected(errors))
    }

    /// Delete workflow: remove by id when given, else by name; notify either way.
    pub fn delete_contact(
        &self,
        command: &DeleteCommand,
        flash: &FlashScope<'_>,
    ) -> ServiceResult<DeleteOutcome> {
        let started_at = Instant::now();
        let result = match command.parsed_id() {
            Some(id) => self.repo.delete_by_id(id),
            None => self.repo.delete_by_name(&command.name),
        };

        match result {
            Ok(()) => {
                flash.enqueue(CATEGORY_SUCCESS, MSG_CONTACT_DELETED);
                info!(
                    "event=contact_delete module=service status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(DeleteOutcome::Deleted)
            }
            Err(RepoError::NotFound(_) | RepoError::NameNotFound(_)) => {
                flash.enqueue(CATEGORY_ERROR, MSG_CONTACT_GONE);
                warn!(
                    "event=contact_delete module=service status=not_found duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(DeleteOutcome::AlreadyGone)
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn name_taken() -> FieldError {
    FieldError::new(ContactField::Name, MSG_NAME_TAKEN)
}

fn contact_gone() -> FieldError {
    FieldError::new(ContactField::Id, MSG_CONTACT_GONE)
}

fn log_rejected(event: &str, errors: &[FieldError], started_at: Instant) {
    let fields = errors
        .iter()
        .map(|error| error.field.as_str())
        .collect::<Vec<_>>()
        .join(",");
    info!(
        "event={event} module=service status=rejected fields={fields} duration_ms={}",
        started_at.elapsed().as_millis()
    );
}
