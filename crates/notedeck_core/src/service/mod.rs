//! Use-case services over the store adapter.
//!
//! # Responsibility
//! - Own in-memory session state and mediate every mutation through the
//!   record store.
//! - Keep store details out of view code.

pub mod modal;
pub mod note_session;
