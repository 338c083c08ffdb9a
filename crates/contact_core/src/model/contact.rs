//! Contact record model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned by the store on insert.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ContactId = Uuid;

/// Persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned id. Serialized as `_id` to match the form field name.
    #[serde(rename = "_id")]
    pub id: ContactId,
    /// Unique human-facing lookup key.
    pub name: String,
    pub email: String,
    /// Indonesian mobile number as entered by the user.
    pub phone: String,
}

impl Contact {
    /// Returns the replaceable fields of this contact.
    pub fn fields(&self) -> NewContact {
        NewContact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Candidate field set for insert and full-replacement update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl NewContact {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Binds this candidate to a store-assigned id.
    pub fn with_id(self, id: ContactId) -> Contact {
        Contact {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
        }
    }
}
