//! Schema versions for the note database.
//!
//! # Invariants
//! - Step `n` of `SCHEMA_STEPS` upgrades the schema from version `n` to `n + 1`.
//! - The reached version is stored in `PRAGMA user_version` inside the same
//!   transaction as the schema change.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

const SCHEMA_STEPS: &[&str] = &[include_str!("0001_notes.sql")];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Upgrades `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Migration` when a step fails; the whole upgrade is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();

    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }
    if found == latest {
        return Ok(());
    }

    info!("event=db_migrate module=db status=start from_version={found} to_version={latest}");
    let tx = conn.transaction()?;
    for (index, sql) in SCHEMA_STEPS.iter().enumerate().skip(found as usize) {
        let step = index as u32 + 1;
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step))
            .map_err(|source| {
                error!("event=db_migrate module=db status=error step={step} error={source}");
                DbError::Migration { step, source }
            })?;
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok version={latest}");
    Ok(())
}
