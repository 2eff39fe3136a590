//! Domain model for the note session.
//!
//! # Responsibility
//! - Define the note record, user identity and form draft shapes shared by
//!   the store adapter, the session controller and the view helpers.
//!
//! # Invariants
//! - Every `Note` is identified by a stable `NoteId` assigned by the store.
//! - `owner_id` is fixed at creation and never rewritten.

pub mod note;
