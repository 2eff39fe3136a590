//! `notedeck` terminal entry point.
//!
//! # Responsibility
//! - Resolve configuration and start logging.
//! - Open the note store and start a session for the configured user.
//! - Hand stdin/stdout to the terminal view.

mod cli;
mod command;
mod terminal;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use cli::Args;
use futures::executor::block_on;
use log::info;
use notedeck_core::{init_logging, NoteSession, SessionError, SqliteNoteStore};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve_config()?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(config.effective_log_level(), log_dir)
            .map_err(|err| anyhow!("starting file logging: {err}"))?;
    }
    config.check_session();

    let store = match &config.database_path {
        Some(path) => SqliteNoteStore::open(path)
            .with_context(|| format!("opening note database {}", path.display()))?,
        None => SqliteNoteStore::open_in_memory().context("opening in-memory note database")?,
    };

    let session = match block_on(NoteSession::start(&config.session_provider(), store)) {
        Ok(session) => session,
        Err(SessionError::NotAuthenticated) => {
            bail!("not signed in: set NOTEDECK_USER_ID or pass --user")
        }
        Err(err) => return Err(err.into()),
    };
    info!(
        "event=cli_start module=cli status=ok notes={}",
        session.snapshot().notes.len()
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    terminal::run(&session, stdin.lock(), stdout.lock())?;
    Ok(())
}
