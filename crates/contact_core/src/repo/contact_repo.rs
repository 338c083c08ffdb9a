//! Contact Store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/lookup/update/delete over the `contacts` table.
//! - Translate constraint violations into semantic errors.
//!
//! # Invariants
//! - `find_all` returns contacts in insertion order.
//! - Each operation is atomic at the single-row level; no multi-row
//!   transactions are needed.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, NewContact};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const CONTACT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    phone
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Contact Store error.
#[derive(Debug)]
pub enum RepoError {
    /// Transport or bootstrap failure; surfaced to users as storage unavailable.
    Db(DbError),
    /// No contact has the given id.
    NotFound(ContactId),
    /// No contact has the given name.
    NameNotFound(String),
    /// Another contact already uses this name.
    DuplicateName(String),
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::NameNotFound(_) => write!(f, "contact not found by name"),
            Self::DuplicateName(_) => write!(f, "contact name already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Contact Store contract.
pub trait ContactRepository {
    /// Lists every contact in insertion order.
    fn find_all(&self) -> RepoResult<Vec<Contact>>;
    /// Exact, case-sensitive name lookup.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Contact>>;
    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Inserts a candidate and returns it with a fresh store-assigned id.
    fn insert(&self, candidate: &NewContact) -> RepoResult<Contact>;
    /// Replaces name, email and phone of the contact with `id`.
    fn update_by_id(&self, id: ContactId, fields: &NewContact) -> RepoResult<()>;
    fn delete_by_name(&self, name: &str) -> RepoResult<()>;
    fn delete_by_id(&self, id: ContactId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<u64>;
}

impl<T: ContactRepository + ?Sized> ContactRepository for &T {
    fn find_all(&self) -> RepoResult<Vec<Contact>> {
        (**self).find_all()
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Contact>> {
        (**self).find_by_name(name)
    }

    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        (**self).find_by_id(id)
    }

    fn insert(&self, candidate: &NewContact) -> RepoResult<Contact> {
        (**self).insert(candidate)
    }

    fn update_by_id(&self, id: ContactId, fields: &NewContact) -> RepoResult<()> {
        (**self).update_by_id(id, fields)
    }

    fn delete_by_name(&self, name: &str) -> RepoResult<()> {
        (**self).delete_by_name(name)
    }

    fn delete_by_id(&self, id: ContactId) -> RepoResult<()> {
        (**self).delete_by_id(id)
    }

    fn count(&self) -> RepoResult<u64> {
        (**self).count()
    }
}

/// SQLite-backed Contact Store.
///
/// Expects a connection returned by `db::open_db*`, so migrations are applied.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Contact>> {
        self.find_one("name", name)
    }

    fn find_by_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.find_one("uuid", id.to_string().as_str())
    }

    fn insert(&self, candidate: &NewContact) -> RepoResult<Contact> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO contacts (uuid, name, email, phone)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    id.to_string(),
                    candidate.name.as_str(),
                    candidate.email.as_str(),
                    candidate.phone.as_str(),
                ],
            )
            .map_err(|err| map_write_error(err, candidate))?;

        Ok(candidate.clone().with_id(id))
    }

    fn update_by_id(&self, id: ContactId, fields: &NewContact) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE contacts
                 SET
                    name = ?1,
                    email = ?2,
                    phone = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?4;",
                params![
                    fields.name.as_str(),
                    fields.email.as_str(),
                    fields.phone.as_str(),
                    id.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, fields))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_by_name(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE name = ?1;", [name])?;

        if changed == 0 {
            return Err(RepoError::NameNotFound(name.to_string()));
        }

        Ok(())
    }

    fn delete_by_id(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative contact count `{count}`")))
    }
}

impl SqliteContactRepository<'_> {
    // `column` is always a compile-time constant, never user input.
    fn find_one(&self, column: &'static str, value: &str) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE {column} = ?1;"))?;
        let row = stmt
            .query_row([value], |row| Ok(parse_contact_row(row)))
            .optional()?;
        row.transpose()
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in contacts.uuid"))
    })?;

    Ok(Contact {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
    })
}

fn map_write_error(err: rusqlite::Error, fields: &NewContact) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, Some(message))
            if failure.code == ErrorCode::ConstraintViolation
                && message.contains("contacts.name") =>
        {
            RepoError::DuplicateName(fields.name.clone())
        }
        _ => err.into(),
    }
}
