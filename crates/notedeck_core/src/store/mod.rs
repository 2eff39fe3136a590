//! Remote store adapter contract.
//!
//! # Responsibility
//! - Define the four owner-scoped record operations the session depends on.
//! - Surface every failure verbatim as `StoreError`; no retries here.
//!
//! # Invariants
//! - Every call is a single round trip scoped by the owner identity.
//! - Update/delete filter by both note id and owner id. A call that matches
//!   no rows resolves as success with `rows_affected == 0`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, OwnerId, ValidationError};
use futures::future::BoxFuture;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod sqlite;

pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a record store.
#[derive(Debug)]
pub enum StoreError {
    /// Storage engine failure.
    Db(DbError),
    /// A row could not be decoded or a write was rejected.
    InvalidData(String),
    /// Transport or remote service failure.
    Unavailable(String),
}

impl StoreError {
    /// Human-readable message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
            Self::Unavailable(message) => f.write_str(message),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Acknowledgement of an update or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub rows_affected: usize,
}

/// Owner-scoped CRUD capability over the note record store.
pub trait NoteStore: Send + Sync {
    /// Lists the owner's notes ordered by `created_at` descending.
    fn list_notes(&self, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Vec<Note>>>;

    /// Inserts one note; the store assigns id and both timestamps.
    fn insert_note<'a>(
        &'a self,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Note>>;

    /// Replaces title/content and refreshes `updated_at`.
    fn update_note<'a>(
        &'a self,
        id: NoteId,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Ack>>;

    /// Deletes one note.
    fn delete_note(&self, id: NoteId, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Ack>>;
}

impl<S: NoteStore + ?Sized> NoteStore for Arc<S> {
    fn list_notes(&self, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Vec<Note>>> {
        (**self).list_notes(owner_id)
    }

    fn insert_note<'a>(
        &'a self,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Note>> {
        (**self).insert_note(owner_id, title, content)
    }

    fn update_note<'a>(
        &'a self,
        id: NoteId,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Ack>> {
        (**self).update_note(id, owner_id, title, content)
    }

    fn delete_note(&self, id: NoteId, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Ack>> {
        (**self).delete_note(id, owner_id)
    }
}
