//! Note session controller.
//!
//! # Responsibility
//! - Own the authoritative note collection for one signed-in user.
//! - Drive the create/edit/delete modal lifecycle.
//! - Call the store for every mutation, then reconcile by full reload.
//!
//! # Invariants
//! - `notes` only ever holds notes owned by the session user, ordered as the
//!   store returned them (`created_at` descending).
//! - A failed reload never clears the previous collection.
//! - Every failed store call leaves a visible message, whatever the modal.
//! - `submit` and `confirm_delete` are single-flight per operation kind.
//! - The state mutex is never held across an `.await`.

use crate::auth::SessionProvider;
use crate::model::note::{Note, NoteDraft, NoteId, User, ValidationError};
use crate::service::modal::ModalState;
use crate::store::{NoteStore, StoreError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Error returned by session intents.
#[derive(Debug)]
pub enum SessionError {
    /// The session provider returned no user.
    NotAuthenticated,
    /// Empty title or content; no store call was made.
    Validation(ValidationError),
    /// The referenced note is not in the local collection.
    NotFound(NoteId),
    /// The same operation kind is already outstanding.
    AlreadyInProgress,
    /// The intent is not valid in the current modal state.
    InvalidTransition {
        operation: &'static str,
        modal: ModalState,
    },
    /// Store round trip failed.
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => f.write_str("not authenticated"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::AlreadyInProgress => f.write_str("operation already in progress"),
            Self::InvalidTransition { operation, modal } => {
                write!(f, "`{operation}` is not allowed while modal is {modal}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for SessionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Where a message is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageScope {
    /// Banner over the note list (load failures).
    List,
    /// Inline error inside the editor.
    Form,
    /// Blocking notification the user must acknowledge.
    Alert,
}

/// User-visible message attached to the session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    pub scope: MessageScope,
    pub text: String,
}

impl SessionMessage {
    pub fn list(text: impl Into<String>) -> Self {
        Self::new(MessageScope::List, text)
    }

    pub fn form(text: impl Into<String>) -> Self {
        Self::new(MessageScope::Form, text)
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self::new(MessageScope::Alert, text)
    }

    fn new(scope: MessageScope, text: impl Into<String>) -> Self {
        Self {
            scope,
            text: text.into(),
        }
    }
}

/// Read-only view of the session after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: User,
    pub notes: Vec<Note>,
    pub modal: ModalState,
    pub draft: NoteDraft,
    pub submitting: bool,
    pub deleting: bool,
    pub message: Option<SessionMessage>,
}

impl SessionSnapshot {
    /// True while any store mutation is outstanding.
    pub fn is_pending(&self) -> bool {
        self.submitting || self.deleting
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    notes: Vec<Note>,
    modal: ModalState,
    draft: NoteDraft,
    /// Bumped on every modal transition so late store results can tell
    /// whether the modal they started from is still showing.
    modal_epoch: u64,
    submitting: bool,
    deleting: bool,
    message: Option<SessionMessage>,
}

impl SessionState {
    fn contains(&self, id: NoteId) -> bool {
        self.notes.iter().any(|note| note.id == id)
    }

    fn transition(&mut self, modal: ModalState, draft: NoteDraft) {
        debug!(
            "event=modal_transition module=session from={} to={}",
            self.modal, modal
        );
        self.modal = modal;
        self.draft = draft;
        self.modal_epoch += 1;
    }

    fn clear_message(&mut self, scope: MessageScope) {
        if self
            .message
            .as_ref()
            .is_some_and(|message| message.scope == scope)
        {
            self.message = None;
        }
    }

    fn clear_modal_messages(&mut self) {
        self.clear_message(MessageScope::Form);
        self.clear_message(MessageScope::Alert);
    }

    /// Closes a modal whose note vanished from the collection.
    fn reconcile_modal(&mut self) {
        let Some(id) = self.modal.note_id() else {
            return;
        };
        if self.contains(id) {
            return;
        }
        warn!("event=modal_reconcile module=session status=closed note_id={id}");
        self.transition(ModalState::Closed, NoteDraft::default());
        self.message = Some(SessionMessage::alert("This note no longer exists."));
    }
}

/// Controller owning one user's note collection and modal state.
pub struct NoteSession<S: NoteStore> {
    store: S,
    user: User,
    state: Mutex<SessionState>,
}

impl<S: NoteStore> NoteSession<S> {
    /// Creates a controller for an already authenticated user.
    ///
    /// The collection starts empty; call [`NoteSession::initialize`] to load it.
    pub fn new(user: User, store: S) -> Self {
        Self {
            store,
            user,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Resolves the user from `provider` and runs the initial load.
    ///
    /// # Errors
    /// - `NotAuthenticated` when the provider has no session. No controller
    ///   is created in that case.
    pub async fn start<P>(provider: &P, store: S) -> Result<Self, SessionError>
    where
        P: SessionProvider + ?Sized,
    {
        let Some(user) = provider.get_session() else {
            warn!("event=session_start module=session status=error error_code=not_authenticated");
            return Err(SessionError::NotAuthenticated);
        };

        let session = Self::new(user, store);
        session.initialize().await;
        Ok(session)
    }

    /// Loads the collection for the first time.
    ///
    /// A failed load leaves `notes` empty and a list-level message visible;
    /// it is never fatal to the session.
    pub async fn initialize(&self) {
        info!(
            "event=session_init module=session status=start owner_id={}",
            self.user.id
        );
        if let Err(err) = self.reload().await {
            warn!("event=session_init module=session status=degraded error={err}");
        }
    }

    /// Replaces the collection with a fresh store snapshot.
    ///
    /// # Errors
    /// - `Store` when listing fails. The previous collection is kept and a
    ///   retryable list-level message is set.
    pub async fn reload(&self) -> Result<(), SessionError> {
        let started_at = Instant::now();
        let result = self.store.list_notes(self.user.id).await;

        let mut state = self.state();
        match result {
            Ok(notes) => {
                let total = notes.len();
                let owned: Vec<Note> = notes
                    .into_iter()
                    .filter(|note| note.owner_id == self.user.id)
                    .collect();
                if owned.len() != total {
                    warn!(
                        "event=session_reload module=session status=filtered dropped={}",
                        total - owned.len()
                    );
                }

                state.notes = owned;
                state.clear_message(MessageScope::List);
                state.reconcile_modal();
                info!(
                    "event=session_reload module=session status=ok count={} duration_ms={}",
                    state.notes.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_reload module=session status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                state.message = Some(SessionMessage::list(format!(
                    "Failed to load notes: {err}. Refresh to try again."
                )));
                Err(SessionError::Store(err))
            }
        }
    }

    /// Opens an empty editor for a new note.
    ///
    /// No-op when the create editor is already open.
    pub fn open_create(&self) {
        let mut state = self.state();
        if state.modal == ModalState::Editing(None) {
            return;
        }
        state.transition(ModalState::Editing(None), NoteDraft::default());
        state.clear_modal_messages();
    }

    /// Opens the editor pre-filled from the in-memory note.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not in the collection; state is unchanged and
    ///   callers treat this as a silent no-op.
    pub fn open_edit(&self, id: NoteId) -> Result<(), SessionError> {
        let mut state = self.state();
        let Some(draft) = state
            .notes
            .iter()
            .find(|note| note.id == id)
            .map(NoteDraft::from_note)
        else {
            debug!("event=open_edit module=session status=ignored note_id={id}");
            return Err(SessionError::NotFound(id));
        };

        if state.modal == ModalState::Editing(Some(id)) {
            return Ok(());
        }
        state.transition(ModalState::Editing(Some(id)), draft);
        state.clear_modal_messages();
        Ok(())
    }

    /// Validates the draft and creates or updates the note.
    ///
    /// On success the modal closes and the collection is reloaded. On store
    /// failure the modal and draft stay as they were and a form-level message
    /// carries the store error, so resubmitting retries.
    ///
    /// # Errors
    /// - `InvalidTransition` when no editor is open.
    /// - `AlreadyInProgress` while a previous submit is outstanding.
    /// - `Validation` when the trimmed title or content is empty.
    /// - `Store` when the insert/update fails.
    pub async fn submit(&self, title: &str, content: &str) -> Result<(), SessionError> {
        let draft = NoteDraft::new(title, content);
        let (target, epoch, title, content) = {
            let mut state = self.state();
            let ModalState::Editing(target) = state.modal else {
                return Err(SessionError::InvalidTransition {
                    operation: "submit",
                    modal: state.modal,
                });
            };
            if state.submitting {
                debug!("event=note_submit module=session status=rejected reason=in_progress");
                return Err(SessionError::AlreadyInProgress);
            }

            state.draft = draft.clone();
            let (title, content) = match draft.validate() {
                Ok((title, content)) => (title.to_string(), content.to_string()),
                Err(err) => {
                    state.message = Some(SessionMessage::form(err.user_message()));
                    return Err(SessionError::Validation(err));
                }
            };
            state.submitting = true;
            state.clear_message(MessageScope::Form);
            (target, state.modal_epoch, title, content)
        };

        let started_at = Instant::now();
        let result = match target {
            None => self
                .store
                .insert_note(self.user.id, &title, &content)
                .await
                .map(|note| {
                    info!(
                        "event=note_create module=session status=ok note_id={} duration_ms={}",
                        note.id,
                        started_at.elapsed().as_millis()
                    );
                }),
            Some(id) => self
                .store
                .update_note(id, self.user.id, &title, &content)
                .await
                .map(|ack| {
                    if ack.rows_affected == 0 {
                        warn!(
                            "event=note_update module=session status=ok note_id={id} rows_affected=0"
                        );
                    } else {
                        info!(
                            "event=note_update module=session status=ok note_id={id} duration_ms={}",
                            started_at.elapsed().as_millis()
                        );
                    }
                }),
        };

        {
            let mut state = self.state();
            state.submitting = false;
            let modal_unchanged = state.modal_epoch == epoch;
            match &result {
                Ok(()) => {
                    if modal_unchanged {
                        state.transition(ModalState::Closed, NoteDraft::default());
                        state.clear_modal_messages();
                    }
                }
                Err(err) => {
                    error!("event=note_submit module=session status=error error={err}");
                    // A closed or replaced editor cannot show the form error.
                    state.message = Some(if modal_unchanged {
                        SessionMessage::form(err.message())
                    } else {
                        SessionMessage::alert(format!("Failed to save note: {err}"))
                    });
                }
            }
        }

        result?;
        // A reload failure leaves its own list-level message; the write stands.
        let _ = self.reload().await;
        Ok(())
    }

    /// Closes any modal and discards the draft.
    pub fn close(&self) {
        let mut state = self.state();
        if state.modal.is_open() {
            state.transition(ModalState::Closed, NoteDraft::default());
        }
        state.clear_modal_messages();
    }

    /// Asks the user to confirm deleting `id`.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not in the collection; silent no-op.
    pub fn request_delete(&self, id: NoteId) -> Result<(), SessionError> {
        let mut state = self.state();
        if !state.contains(id) {
            debug!("event=request_delete module=session status=ignored note_id={id}");
            return Err(SessionError::NotFound(id));
        }
        if state.modal == ModalState::ConfirmingDelete(id) {
            return Ok(());
        }
        state.transition(ModalState::ConfirmingDelete(id), NoteDraft::default());
        state.clear_modal_messages();
        Ok(())
    }

    /// Deletes the note awaiting confirmation.
    ///
    /// On failure the confirmation stays open and an alert is raised; the
    /// caller retries by invoking this again.
    ///
    /// # Errors
    /// - `InvalidTransition` when no delete is awaiting confirmation.
    /// - `AlreadyInProgress` while a previous delete is outstanding.
    /// - `Store` when the delete fails.
    pub async fn confirm_delete(&self) -> Result<(), SessionError> {
        let (id, epoch) = {
            let mut state = self.state();
            let ModalState::ConfirmingDelete(id) = state.modal else {
                return Err(SessionError::InvalidTransition {
                    operation: "confirm_delete",
                    modal: state.modal,
                });
            };
            if state.deleting {
                debug!("event=note_delete module=session status=rejected reason=in_progress");
                return Err(SessionError::AlreadyInProgress);
            }
            state.deleting = true;
            state.clear_message(MessageScope::Alert);
            (id, state.modal_epoch)
        };

        let started_at = Instant::now();
        let result = self.store.delete_note(id, self.user.id).await;

        {
            let mut state = self.state();
            state.deleting = false;
            match &result {
                Ok(ack) => {
                    info!(
                        "event=note_delete module=session status=ok note_id={id} rows_affected={} duration_ms={}",
                        ack.rows_affected,
                        started_at.elapsed().as_millis()
                    );
                    if state.modal_epoch == epoch {
                        state.transition(ModalState::Closed, NoteDraft::default());
                    }
                }
                Err(err) => {
                    error!(
                        "event=note_delete module=session status=error note_id={id} error={err}"
                    );
                    state.message = Some(SessionMessage::alert(format!(
                        "Failed to delete note: {err}. Please try again."
                    )));
                }
            }
        }

        result?;
        let _ = self.reload().await;
        Ok(())
    }

    /// Acknowledges the displayed message.
    pub fn dismiss_message(&self) {
        self.state().message = None;
    }

    /// Returns a copy of the state for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            user: self.user.clone(),
            notes: state.notes.clone(),
            modal: state.modal,
            draft: state.draft.clone(),
            submitting: state.submitting,
            deleting: state.deleting,
            message: state.message.clone(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
