//! Pure rendering helpers for the note list and modals.
//!
//! Nothing here touches session state; callers pass a snapshot in.

pub mod card;
pub mod format;

pub use card::{delete_label, modal_heading, render_cards, submit_label, summary_line, NoteCard};
pub use format::{escape_html, format_note_date};
