#![allow(dead_code)]

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{BoxFuture, FutureExt};
use notedeck_core::db::open_db_in_memory;
use notedeck_core::{
    Ack, Note, NoteId, NoteSession, NoteStore, OwnerId, SqliteNoteStore, StaticSessionProvider,
    StoreError, StoreResult, User,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const CLOCK_START_MS: i64 = 1_800_000_000_000;
pub const CLOCK_STEP_MS: i64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Insert,
    Update,
    Delete,
}

/// SQLite store wrapper with call counting, queued failures and gates that
/// hold a call open until the test releases it.
pub struct ScriptedStore {
    inner: SqliteNoteStore,
    calls: Mutex<HashMap<Op, usize>>,
    failures: Mutex<Vec<(Op, String)>>,
    gates: Mutex<Vec<(Op, oneshot::Receiver<()>)>>,
    extra_list_rows: Mutex<Vec<Note>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteNoteStore::with_clock(open_db_in_memory().unwrap(), ticking_clock()),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(Vec::new()),
            gates: Mutex::new(Vec::new()),
            extra_list_rows: Mutex::new(Vec::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Inserts directly into the backing store without counting a call.
    pub fn seed(&self, owner_id: OwnerId, title: &str, content: &str) -> Note {
        block_on(self.inner.insert_note(owner_id, title, content)).unwrap()
    }

    /// Deletes directly from the backing store, simulating another client.
    pub fn remove_behind_the_back(&self, id: NoteId, owner_id: OwnerId) {
        block_on(self.inner.delete_note(id, owner_id)).unwrap();
    }

    pub fn fail_next(&self, op: Op, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((op, message.to_string()));
    }

    /// Holds the next `op` call until the returned sender fires or drops.
    pub fn hold_next(&self, op: Op) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push((op, rx));
        tx
    }

    /// Appends a row to every list result, as a misbehaving backend would.
    pub fn leak_into_list(&self, note: Note) {
        self.extra_list_rows.lock().unwrap().push(note);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    async fn before(&self, op: Op) -> StoreResult<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;

        let gate = take_first(&mut self.gates.lock().unwrap(), op);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match take_first(&mut self.failures.lock().unwrap(), op) {
            Some(message) => Err(StoreError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

impl NoteStore for ScriptedStore {
    fn list_notes(&self, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Vec<Note>>> {
        async move {
            self.before(Op::List).await?;
            let mut notes = self.inner.list_notes(owner_id).await?;
            notes.extend(self.extra_list_rows.lock().unwrap().iter().cloned());
            Ok(notes)
        }
        .boxed()
    }

    fn insert_note<'a>(
        &'a self,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Note>> {
        async move {
            self.before(Op::Insert).await?;
            self.inner.insert_note(owner_id, title, content).await
        }
        .boxed()
    }

    fn update_note<'a>(
        &'a self,
        id: NoteId,
        owner_id: OwnerId,
        title: &'a str,
        content: &'a str,
    ) -> BoxFuture<'a, StoreResult<Ack>> {
        async move {
            self.before(Op::Update).await?;
            self.inner.update_note(id, owner_id, title, content).await
        }
        .boxed()
    }

    fn delete_note(&self, id: NoteId, owner_id: OwnerId) -> BoxFuture<'_, StoreResult<Ack>> {
        async move {
            self.before(Op::Delete).await?;
            self.inner.delete_note(id, owner_id).await
        }
        .boxed()
    }
}

fn take_first<T>(queue: &mut Vec<(Op, T)>, op: Op) -> Option<T> {
    let index = queue.iter().position(|(queued, _)| *queued == op)?;
    Some(queue.remove(index).1)
}

/// Clock that advances one step per read so `created_at` is strictly increasing.
pub fn ticking_clock() -> impl Fn() -> i64 + Send + Sync + 'static {
    let next = AtomicI64::new(CLOCK_START_MS);
    move || next.fetch_add(CLOCK_STEP_MS, Ordering::SeqCst)
}

pub fn test_user() -> User {
    User::new(Uuid::new_v4(), "reader@example.com")
}

pub fn start_session(
    store: &Arc<ScriptedStore>,
    user: &User,
) -> NoteSession<Arc<ScriptedStore>> {
    let provider = StaticSessionProvider::signed_in(user.clone());
    block_on(NoteSession::start(&provider, Arc::clone(store))).unwrap()
}
