//! Note record and form draft.
//!
//! # Responsibility
//! - Define the canonical `Note` shape returned by the record store.
//! - Validate form drafts before they reach the store.
//!
//! # Invariants
//! - `title` and `content` of a persisted note are non-empty after trimming.
//! - `created_at <= updated_at` for every note written by this crate.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one note, assigned by the store on insert.
pub type NoteId = Uuid;

/// Identity of the user owning a note.
pub type OwnerId = Uuid;

/// Current time in epoch milliseconds, the unit of every note timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Authenticated user identity supplied by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: OwnerId,
    pub email: String,
}

impl User {
    pub fn new(id: OwnerId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// One note record as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Serialized as `user_id` to match the record schema.
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by the store on every update.
    pub updated_at: i64,
}

/// Form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Content,
}

impl Display for DraftField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Content => f.write_str("content"),
        }
    }
}

/// Local validation failure. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(DraftField),
}

impl ValidationError {
    /// Message shown inline in the editor.
    pub fn user_message(&self) -> &'static str {
        "Please fill in all fields"
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "note {field} must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Editor values exactly as the user entered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Pre-populates a draft from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self::new(note.title.clone(), note.content.clone())
    }

    /// Returns trimmed `(title, content)` when both are non-empty.
    pub fn validate(&self) -> Result<(&str, &str), ValidationError> {
        validate_fields(&self.title, &self.content)
    }
}

/// Trims and checks note fields. Title is checked before content.
pub fn validate_fields<'a>(
    title: &'a str,
    content: &'a str,
) -> Result<(&'a str, &'a str), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyField(DraftField::Title));
    }
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyField(DraftField::Content));
    }
    Ok((title, content))
}
