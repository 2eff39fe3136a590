//! SQLite-backed note record store.
//!
//! # Responsibility
//! - Implement the owner-scoped `NoteStore` contract on top of the `notes`
//!   table created by `db` migrations.
//! - Assign ids and timestamps on insert, refresh `updated_at` on update.
//!
//! # Invariants
//! - Every statement filters by `user_id`; no query reads or mutates another
//!   owner's rows.
//! - Writes validate trimmed title/content before touching SQL.
//! - Each call runs one statement and resolves without suspending.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{now_millis, validate_fields, Note, NoteId, OwnerId};
use crate::store::{Ack, NoteStore, StoreError, StoreResult};
use futures::future::{self, BoxFuture, FutureExt};
use log::{debug, error};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    title,
    content,
    created_at,
    updated_at
FROM notes";

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Note store over one SQLite connection.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
    clock: Clock,
}

impl SqliteNoteStore {
    /// Wraps a migrated connection using the system clock.
    pub fn new(conn: Connection) -> Self {
        Self::with_clock(conn, now_millis)
    }

    /// Wraps a migrated connection with a caller-provided epoch-ms clock.
    pub fn with_clock<F>(conn: Connection, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        Self {
            conn: Mutex::new(conn),
            clock: Box::new(clock),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn list_blocking(&self, owner_id: OwnerId) -> StoreResult<Vec<Note>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn insert_blocking(&self, owner_id: OwnerId, title: &str, content: &str) -> StoreResult<Note> {
        let (title, content) = validate_fields(title, content)?;
        let now = (self.clock)();
        let note = Note {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.conn().execute(
            "INSERT INTO notes (id, user_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id.to_string(),
                note.owner_id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_at,
                note.updated_at,
            ],
        )?;

        Ok(note)
    }

    fn update_blocking(
        &self,
        id: NoteId,
        owner_id: OwnerId,
        title: &str,
        content: &str,
    ) -> StoreResult<Ack> {
        let (title, content) = validate_fields(title, content)?;
        let now = (self.clock)();
        let rows_affected = self.conn().execute(
            "UPDATE notes
             SET
                title = ?3,
                content = ?4,
                updated_at = MAX(created_at, ?5)
             WHERE id = ?1
               AND user_id = ?2;",
            params![id.to_string(), owner_id.to_string(), title, content, now],
        )?;
        Ok(Ack { rows_affected })
    }

    fn delete_blocking(&self, id: NoteId, owner_id: OwnerId) -> StoreResult<Ack> {
        let rows_affected = self.conn().execute(
            "DELETE FROM notes
             WHERE id = ?1
               AND user_id = ?2;",
            params![id.to_string(), owner_id.to_string()],
        )?;
        Ok(Ack { rows_affected })
    }
}

impl NoteStore for SqliteNoteStore {
    fn list_notes(&self, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Vec<Note>>> {
        let result = self.list_blocking(owner_id);
        log_result("store_list", &result, |notes| notes.len());
        future::ready(result).boxed()
    }

    fn insert_note<'a>(
        &'a self,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Note>> {
        let result = self.insert_blocking(owner_id, title, content);
        log_result("store_insert", &result, |_| 1);
        future::ready(result).boxed()
    }

    fn update_note<'a>(
        &'a self,
        id: NoteId,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Ack>> {
        let result = self.update_blocking(id, owner_id, title, content);
        log_result("store_update", &result, |ack| ack.rows_affected);
        future::ready(result).boxed()
    }

    fn delete_note(&self, id: NoteId, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Ack>> {
        let result = self.delete_blocking(id, owner_id);
        log_result("store_delete", &result, |ack| ack.rows_affected);
        future::ready(result).boxed()
    }
}

fn log_result<T>(event: &str, result: &StoreResult<T>, rows: impl Fn(&T) -> usize) {
    match result {
        Ok(value) => debug!("event={event} module=store status=ok rows={}", rows(value)),
        Err(err) => error!("event={event} module=store status=error error={err}"),
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id"))
    })?;

    let owner_text: String = row.get("user_id")?;
    let owner_id = Uuid::parse_str(&owner_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{owner_text}` in notes.user_id"))
    })?;

    Ok(Note {
        id,
        owner_id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
