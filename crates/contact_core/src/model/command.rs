//! Transient per-request command shapes.
//!
//! Commands carry raw, unvalidated strings exactly as submitted so a rejected
//! form can be redisplayed without losing input.

use crate::model::contact::{ContactId, NewContact};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Which workflow a command is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Add,
    Edit,
}

/// Add/Edit form submission.
///
/// Wire names follow the form fields: `_id` and `oldName` are only sent by
/// the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactCommand {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "oldName", default)]
    pub old_name: Option<String>,
}

impl ContactCommand {
    /// Builds an add command.
    pub fn add(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            old_name: None,
        }
    }

    /// Builds an edit command targeting `id`, currently named `old_name`.
    pub fn edit(
        id: ContactId,
        old_name: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.to_string()),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            old_name: Some(old_name.into()),
        }
    }

    /// Parses the submitted id, if any.
    ///
    /// Blank and malformed ids both yield `None`.
    pub fn parsed_id(&self) -> Option<ContactId> {
        parse_contact_id(self.id.as_deref())
    }

    /// Returns the candidate fields carried by this command.
    pub fn to_new_contact(&self) -> NewContact {
        NewContact::new(
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
        )
    }
}

/// Delete form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCommand {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl DeleteCommand {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn by_id(id: ContactId) -> Self {
        Self {
            id: Some(id.to_string()),
            name: String::new(),
        }
    }

    pub fn parsed_id(&self) -> Option<ContactId> {
        parse_contact_id(self.id.as_deref())
    }
}

/// Form field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Id,
    Name,
    Email,
    Phone,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl Display for ContactField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected field with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: ContactField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: ContactField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn parse_contact_id(value: Option<&str>) -> Option<ContactId> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| Uuid::parse_str(value).ok())
}
