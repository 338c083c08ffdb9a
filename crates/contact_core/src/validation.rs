//! Declarative field rules for contact commands.
//!
//! # Responsibility
//! - Check name presence/uniqueness, email grammar and `id-ID` mobile grammar.
//! - Keep names that would shadow a fixed `/contact/...` route out of the store.
//! - Collect every violation instead of stopping at the first one.
//!
//! # Invariants
//! - Renaming a contact to its own current name is always legal.
//! - A failed store lookup is an error, never a silent pass.

use crate::model::command::{ContactCommand, ContactField, FieldError, Intent};
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;

pub const MSG_NAME_REQUIRED: &str = "Contact name is required";
pub const MSG_NAME_TAKEN: &str = "Contact name is already taken";
pub const MSG_NAME_RESERVED: &str = "Contact name is reserved";
pub const MSG_EMAIL_INVALID: &str = "Invalid email!";
pub const MSG_PHONE_INVALID: &str = "Invalid phone number!";

/// Detail URLs are `/contact/<name>`; these segments resolve elsewhere.
pub const RESERVED_NAMES: &[&str] = &["add", ".", ".."];

const EMAIL_MAX_CHARS: usize = 254;
const EMAIL_LOCAL_MAX_CHARS: usize = 64;

static EMAIL_LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("valid email local-part regex")
});
static EMAIL_DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("valid email domain regex")
});
// Country code or trunk zero, then `8`, operator prefix, subscriber digits.
static ID_MOBILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+?62|0)8(1[1-9]|2[1238]|3[1238]|5[1-35-9]|7[78]|8[1-9]|9[5-9])[\s\d]{5,11}$")
        .expect("valid id-ID mobile regex")
});

/// One field constraint over a contact command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRule {
    NameRequired,
    NameUnique,
    NameRoutable,
    EmailFormat,
    PhoneFormat,
}

/// Rules applied to Add and Edit commands, in reporting order.
pub const CONTACT_RULES: &[ContactRule] = &[
    ContactRule::NameRequired,
    ContactRule::NameUnique,
    ContactRule::NameRoutable,
    ContactRule::EmailFormat,
    ContactRule::PhoneFormat,
];

impl ContactRule {
    /// Evaluates this rule.
    ///
    /// Returns `Ok(None)` on pass, `Ok(Some(error))` on violation, and `Err`
    /// when the store lookup behind the rule fails.
    pub fn check<R: ContactRepository + ?Sized>(
        self,
        repo: &R,
        command: &ContactCommand,
        intent: Intent,
    ) -> RepoResult<Option<FieldError>> {
        match self {
            Self::NameRequired => Ok(is_blank(&command.name)
                .then(|| FieldError::new(ContactField::Name, MSG_NAME_REQUIRED))),
            Self::NameUnique => check_name_unique(repo, command, intent),
            Self::NameRoutable => {
                let reserved = is_reserved_name(&command.name) && !keeps_own_name(command, intent);
                Ok(reserved.then(|| FieldError::new(ContactField::Name, MSG_NAME_RESERVED)))
            }
            Self::EmailFormat => Ok((!is_valid_email(&command.email))
                .then(|| FieldError::new(ContactField::Email, MSG_EMAIL_INVALID))),
            Self::PhoneFormat => Ok((!is_valid_mobile_phone(&command.phone))
                .then(|| FieldError::new(ContactField::Phone, MSG_PHONE_INVALID))),
        }
    }
}

/// Runs every rule in [`CONTACT_RULES`] and returns all violations.
///
/// An empty vector means the command may proceed to the store.
pub fn validate_contact<R: ContactRepository + ?Sized>(
    repo: &R,
    command: &ContactCommand,
    intent: Intent,
) -> RepoResult<Vec<FieldError>> {
    let mut errors = Vec::new();
    for rule in CONTACT_RULES {
        if let Some(error) = rule.check(repo, command, intent)? {
            errors.push(error);
        }
    }
    Ok(errors)
}

fn check_name_unique<R: ContactRepository + ?Sized>(
    repo: &R,
    command: &ContactCommand,
    intent: Intent,
) -> RepoResult<Option<FieldError>> {
    // Blank names are reported by `NameRequired`.
    if is_blank(&command.name) {
        return Ok(None);
    }
    if keeps_own_name(command, intent) {
        return Ok(None);
    }

    let taken = repo.find_by_name(&command.name)?.is_some();
    Ok(taken.then(|| FieldError::new(ContactField::Name, MSG_NAME_TAKEN)))
}

/// Returns whether `value` is a syntactically valid email address.
///
/// Requires a dotted domain with an alphabetic top-level label.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().count() > EMAIL_MAX_CHARS {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().count() > EMAIL_LOCAL_MAX_CHARS {
        return false;
    }
    EMAIL_LOCAL_RE.is_match(local) && EMAIL_DOMAIN_RE.is_match(domain)
}

/// Returns whether `value` is an Indonesian (`id-ID`) mobile number.
pub fn is_valid_mobile_phone(value: &str) -> bool {
    ID_MOBILE_RE.is_match(value)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn keeps_own_name(command: &ContactCommand, intent: Intent) -> bool {
    intent == Intent::Edit && command.old_name.as_deref() == Some(command.name.as_str())
}

fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}
