//! Note database bootstrap.
//!
//! `open_db`/`open_db_in_memory` hand out connections whose `notes` schema is
//! at [`migrations::latest_version`]. Nothing reads or writes note rows on a
//! connection that failed to reach that version.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Connection-level or statement failure outside a schema step.
    Sqlite(rusqlite::Error),
    /// Schema step `step` (1-based target version) failed and was rolled back.
    Migration {
        step: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a build with a newer schema.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Migration { step, source } => {
                write!(f, "notes schema upgrade to version {step} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "notes schema version {db_version} is newer than this build \
                 understands ({latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
