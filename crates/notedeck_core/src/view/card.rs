//! Note card projection and modal labels.

use crate::model::note::{Note, NoteId};
use crate::service::modal::ModalState;
use crate::view::format::{escape_html, format_note_date};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Render-ready projection of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteId,
    pub title_html: String,
    pub content_html: String,
    /// Relative label derived from `updated_at`.
    pub date_label: String,
}

impl NoteCard {
    pub fn from_note(note: &Note, now_ms: i64) -> Self {
        Self {
            id: note.id,
            title_html: escape_html(&note.title),
            content_html: escape_html(&note.content),
            date_label: format_note_date(note.updated_at, now_ms),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="note-card" data-note-id="{id}">"#,
                r#"<div class="note-header"><h3 class="note-title">{title}</h3></div>"#,
                r#"<div class="note-content">{content}</div>"#,
                r#"<div class="note-footer"><span class="note-date">{date}</span></div>"#,
                "</div>"
            ),
            id = self.id,
            title = self.title_html,
            content = self.content_html,
            date = escape_html(&self.date_label),
        )
    }
}

/// Projects the collection in its current order.
pub fn render_cards(notes: &[Note], now_ms: i64) -> Vec<NoteCard> {
    notes
        .iter()
        .map(|note| NoteCard::from_note(note, now_ms))
        .collect()
}

/// Collapses whitespace and truncates to `max_chars`, appending "...".
pub fn summary_line(content: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = collapsed.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut summary: String = trimmed.chars().take(max_chars).collect();
    summary.push_str("...");
    summary
}

pub fn modal_heading(modal: ModalState) -> &'static str {
    match modal {
        ModalState::Closed => "",
        ModalState::Editing(None) => "Create Note",
        ModalState::Editing(Some(_)) => "Edit Note",
        ModalState::ConfirmingDelete(_) => "Delete Note",
    }
}

pub fn submit_label(modal: ModalState, submitting: bool) -> &'static str {
    match (modal, submitting) {
        (ModalState::Editing(Some(_)), false) => "Update Note",
        (ModalState::Editing(Some(_)), true) => "Updating...",
        (_, true) => "Saving...",
        (_, false) => "Save Note",
    }
}

pub fn delete_label(deleting: bool) -> &'static str {
    if deleting {
        "Deleting..."
    } else {
        "Delete"
    }
}
