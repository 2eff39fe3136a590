//! Core logic for NoteDeck.
//! Owns the note session state machine and its store adapter contract.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod view;

pub use auth::{SessionProvider, StaticSessionProvider};
pub use config::{load_config, ConfigError, CoreConfig, SessionConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{now_millis, Note, NoteDraft, NoteId, OwnerId, User, ValidationError};
pub use service::modal::ModalState;
pub use service::note_session::{
    MessageScope, NoteSession, SessionError, SessionMessage, SessionSnapshot,
};
pub use store::{Ack, NoteStore, SqliteNoteStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
