//! Modal interaction state.
//!
//! # Invariants
//! - Exactly one modal state is active at a time.
//! - `Editing(Some(id))` and `ConfirmingDelete(id)` reference a note present
//!   in the session collection.

use crate::model::note::NoteId;
use std::fmt::{Display, Formatter};

/// UI mode of the note session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    /// `None` creates a new note, `Some(id)` edits an existing one.
    Editing(Option<NoteId>),
    ConfirmingDelete(NoteId),
}

impl ModalState {
    /// Note referenced by the modal, if any.
    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            Self::Closed | Self::Editing(None) => None,
            Self::Editing(Some(id)) | Self::ConfirmingDelete(id) => Some(*id),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }
}

impl Display for ModalState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Editing(None) => f.write_str("creating"),
            Self::Editing(Some(id)) => write!(f, "editing:{id}"),
            Self::ConfirmingDelete(id) => write!(f, "confirming_delete:{id}"),
        }
    }
}
