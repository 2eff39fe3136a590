//! Line-oriented note view.
//!
//! # Responsibility
//! - Render the session snapshot as plain text.
//! - Translate typed lines into session intents.
//!
//! # Invariants
//! - Never mutates notes directly; every change goes through `NoteSession`.
//! - The prompt shown always follows the current modal state.

use crate::command::{parse_command, Command, HELP};
use futures::executor::block_on;
use log::debug;
use notedeck_core::view::{
    delete_label, format_note_date, modal_heading, submit_label, summary_line,
};
use notedeck_core::{
    now_millis, MessageScope, ModalState, NoteId, NoteSession, NoteStore, SessionError,
    SessionSnapshot,
};
use std::io::{self, BufRead, Write};

const SUMMARY_CHARS: usize = 60;
const CANCEL: &str = ":cancel";

/// Runs the prompt loop until `quit` or end of input.
pub fn run<S, R, W>(session: &NoteSession<S>, mut input: R, mut out: W) -> io::Result<()>
where
    S: NoteStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "signed in as {}", display_user(&session.snapshot()))?;
    render_list(&session.snapshot(), &mut out)?;

    loop {
        let snapshot = session.snapshot();
        if let Some(message) = snapshot
            .message
            .as_ref()
            .filter(|message| message.scope == MessageScope::Alert)
        {
            writeln!(out, "!! {}", message.text)?;
            write!(out, "press Enter to continue ")?;
            out.flush()?;
            if read_line(&mut input)?.is_none() {
                return Ok(());
            }
            session.dismiss_message();
            continue;
        }

        let keep_going = match snapshot.modal {
            ModalState::Closed => closed_step(session, &snapshot, &mut input, &mut out)?,
            ModalState::Editing(_) => editor_step(session, &snapshot, &mut input, &mut out)?,
            ModalState::ConfirmingDelete(id) => {
                confirm_step(session, &snapshot, id, &mut input, &mut out)?
            }
        };
        if !keep_going {
            return Ok(());
        }
    }
}

fn closed_step<S, R, W>(
    session: &NoteSession<S>,
    snapshot: &SessionSnapshot,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool>
where
    S: NoteStore,
    R: BufRead,
    W: Write,
{
    write!(out, "> ")?;
    out.flush()?;
    let Some(line) = read_line(input)? else {
        return Ok(false);
    };

    let command = match parse_command(&line) {
        Ok(command) => command,
        Err(err) => {
            writeln!(out, "{err}")?;
            return Ok(true);
        }
    };
    debug!("event=cli_command module=cli command={command:?}");

    match command {
        Command::List => render_list(snapshot, out)?,
        Command::Refresh => {
            // The list banner carries the failure text.
            let _ = block_on(session.reload());
            render_list(&session.snapshot(), out)?;
        }
        Command::New => session.open_create(),
        Command::Edit(index) => match note_at(snapshot, index) {
            Some(id) => ignore_missing(session.open_edit(id), out)?,
            None => writeln!(out, "no note number {index}")?,
        },
        Command::Delete(index) => match note_at(snapshot, index) {
            Some(id) => ignore_missing(session.request_delete(id), out)?,
            None => writeln!(out, "no note number {index}")?,
        },
        Command::Dismiss => session.dismiss_message(),
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn editor_step<S, R, W>(
    session: &NoteSession<S>,
    snapshot: &SessionSnapshot,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool>
where
    S: NoteStore,
    R: BufRead,
    W: Write,
{
    writeln!(out, "== {} ==", modal_heading(snapshot.modal))?;
    if let Some(message) = &snapshot.message {
        if message.scope == MessageScope::Form {
            writeln!(out, "error: {}", message.text)?;
        }
    }

    let Some(title) = prompt_field(input, out, "title", &snapshot.draft.title)? else {
        return Ok(false);
    };
    let Some(title) = title else {
        session.close();
        return Ok(true);
    };
    let Some(content) = prompt_field(input, out, "content", &snapshot.draft.content)? else {
        return Ok(false);
    };
    let Some(content) = content else {
        session.close();
        return Ok(true);
    };

    writeln!(out, "{}", submit_label(snapshot.modal, true))?;
    match block_on(session.submit(&title, &content)) {
        Ok(()) => render_list(&session.snapshot(), out)?,
        // Shown inline on the next editor pass.
        Err(SessionError::Validation(_)) | Err(SessionError::Store(_)) => {}
        Err(err) => writeln!(out, "{err}")?,
    }
    Ok(true)
}

fn confirm_step<S, R, W>(
    session: &NoteSession<S>,
    snapshot: &SessionSnapshot,
    id: NoteId,
    input: &mut R,
    out: &mut W,
) -> io::Result<bool>
where
    S: NoteStore,
    R: BufRead,
    W: Write,
{
    let title = snapshot
        .note(id)
        .map(|note| note.title.as_str())
        .unwrap_or_default();
    writeln!(out, "== {} ==", modal_heading(snapshot.modal))?;
    write!(out, "Are you sure you want to delete \"{title}\"? [y/N] ")?;
    out.flush()?;
    let Some(answer) = read_line(input)? else {
        return Ok(false);
    };

    if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        session.close();
        return Ok(true);
    }

    writeln!(out, "{}", delete_label(true))?;
    match block_on(session.confirm_delete()) {
        Ok(()) => render_list(&session.snapshot(), out)?,
        // Failure raises an alert shown before the next prompt.
        Err(SessionError::Store(_)) => {}
        Err(err) => writeln!(out, "{err}")?,
    }
    Ok(true)
}

/// `Ok(None)` on end of input, `Ok(Some(None))` on cancel.
fn prompt_field<R, W>(
    input: &mut R,
    out: &mut W,
    label: &str,
    current: &str,
) -> io::Result<Option<Option<String>>>
where
    R: BufRead,
    W: Write,
{
    if current.is_empty() {
        write!(out, "{label}: ")?;
    } else {
        write!(out, "{label} [{current}]: ")?;
    }
    out.flush()?;

    let Some(line) = read_line(input)? else {
        return Ok(None);
    };
    if line.trim() == CANCEL {
        return Ok(Some(None));
    }
    if line.is_empty() {
        return Ok(Some(Some(current.to_string())));
    }
    Ok(Some(Some(line)))
}

fn render_list<W: Write>(snapshot: &SessionSnapshot, out: &mut W) -> io::Result<()> {
    if let Some(message) = &snapshot.message {
        if message.scope == MessageScope::List {
            writeln!(out, "[{}]", message.text)?;
        }
    }

    if snapshot.notes.is_empty() {
        return writeln!(out, "No notes yet. Type `new` to create your first note.");
    }

    let now = now_millis();
    for (index, note) in snapshot.notes.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {}  ({})",
            index + 1,
            note.title,
            format_note_date(note.updated_at, now)
        )?;
        writeln!(out, "     {}", summary_line(&note.content, SUMMARY_CHARS))?;
    }
    Ok(())
}

fn display_user(snapshot: &SessionSnapshot) -> String {
    if snapshot.user.email.is_empty() {
        snapshot.user.id.to_string()
    } else {
        snapshot.user.email.clone()
    }
}

fn note_at(snapshot: &SessionSnapshot, index: usize) -> Option<NoteId> {
    snapshot.notes.get(index.checked_sub(1)?).map(|note| note.id)
}

fn ignore_missing<W: Write>(result: Result<(), SessionError>, out: &mut W) -> io::Result<()> {
    match result {
        Ok(()) | Err(SessionError::NotFound(_)) => Ok(()),
        Err(err) => writeln!(out, "{err}"),
    }
}

/// Reads one line without its terminator. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::run;
    use futures::executor::block_on;
    use notedeck_core::{NoteSession, SqliteNoteStore, User};
    use uuid::Uuid;

    fn session() -> NoteSession<SqliteNoteStore> {
        let store = SqliteNoteStore::open_in_memory().expect("open store");
        let session = NoteSession::new(User::new(Uuid::new_v4(), "me@example.com"), store);
        block_on(session.initialize());
        session
    }

    fn drive(session: &NoteSession<SqliteNoteStore>, script: &str) -> String {
        let mut out = Vec::new();
        run(session, script.as_bytes(), &mut out).expect("run terminal");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn creates_note_through_editor_prompts() {
        let session = session();
        let output = drive(&session, "new\nGroceries\nmilk and eggs\nquit\n");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.notes.len(), 1);
        assert_eq!(snapshot.notes[0].title, "Groceries");
        assert!(!snapshot.modal.is_open());
        assert!(output.contains("== Create Note =="));
        assert!(output.contains("  1. Groceries  (Just now)"));
    }

    #[test]
    fn blank_submit_shows_inline_error_and_cancel_discards() {
        let session = session();
        let output = drive(&session, "new\n\n\n:cancel\nquit\n");

        assert!(output.contains("error: Please fill in all fields"));
        let snapshot = session.snapshot();
        assert!(snapshot.notes.is_empty());
        assert!(!snapshot.modal.is_open());
    }

    #[test]
    fn edit_keeps_current_values_on_enter() {
        let session = session();
        drive(&session, "new\nTitle\nBody\nquit\n");
        drive(&session, "edit 1\n\nNew body\nquit\n");

        let note = &session.snapshot().notes[0];
        assert_eq!(note.title, "Title");
        assert_eq!(note.content, "New body");
    }

    #[test]
    fn delete_requires_confirmation() {
        let session = session();
        drive(&session, "new\nKeep me\nBody\nquit\n");

        let output = drive(&session, "delete 1\nn\nquit\n");
        assert!(output.contains("Are you sure you want to delete \"Keep me\"?"));
        assert_eq!(session.snapshot().notes.len(), 1);

        drive(&session, "delete 1\ny\nquit\n");
        assert!(session.snapshot().notes.is_empty());
    }

    #[test]
    fn unknown_index_and_eof_end_cleanly() {
        let session = session();
        let output = drive(&session, "edit 4\nbogus");

        assert!(output.contains("no note number 4"));
        assert!(output.contains("unknown command `bogus`"));
        assert!(output.contains("No notes yet."));
    }
}
