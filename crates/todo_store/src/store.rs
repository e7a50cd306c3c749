//! Todo list store: in-memory list mirrored to a key-value backend

use crate::error::{PersistenceError, Result, TodoError};
use crate::id::{IdGenerator, UuidGenerator};
use crate::storage::KeyValueStore;
use crate::structs::{TodoItem, TodoList};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Key the whole list is stored under unless overridden
pub const DEFAULT_STORAGE_KEY: &str = "todos";

const MAX_ID_ATTEMPTS: usize = 8;
const ERROR_CHANNEL_CAPACITY: usize = 32;

struct ListState {
    list: TodoList,
    /// Bumped on every change to `list`
    revision: u64,
}

/// Owns the authoritative todo list and keeps the backing store in sync.
///
/// Every operation that changes the list re-serializes the whole list and
/// writes it under a single key before returning. Operations that change
/// nothing do not write.
///
/// Writes are funnelled through one gate: at most one write is in flight,
/// and a write always serializes the newest list, so a queued write whose
/// revision is already covered by a later one is skipped. A failed write is
/// reported on the error channel and the in-memory change is kept.
pub struct TodoStore<S: KeyValueStore> {
    storage: Arc<S>,
    ids: Arc<dyn IdGenerator>,
    key: String,
    state: Mutex<ListState>,
    /// Last revision written successfully. Held for the duration of a write.
    writer: Mutex<u64>,
    errors: broadcast::Sender<PersistenceError>,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Create a store over `storage` with an empty list. Call [`load`] to
    /// populate it.
    ///
    /// [`load`]: TodoStore::load
    pub fn new(storage: S) -> Self {
        let (errors, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);
        Self {
            storage: Arc::new(storage),
            ids: Arc::new(UuidGenerator),
            key: DEFAULT_STORAGE_KEY.to_string(),
            state: Mutex::new(ListState {
                list: TodoList::new(),
                revision: 0,
            }),
            writer: Mutex::new(0),
            errors,
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Receive persistence failures reported from now on
    pub fn subscribe_errors(&self) -> broadcast::Receiver<PersistenceError> {
        self.errors.subscribe()
    }

    /// Replace the in-memory list with the one held by the backing store.
    ///
    /// A missing value yields an empty list. Read failures and malformed
    /// values are reported on the error channel and also yield an empty list.
    pub async fn load(&self) -> TodoList {
        let mut persisted = self.writer.lock().await;

        let list = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<TodoList>(&raw) {
                Ok(list) => dedup_ids(list),
                Err(e) => {
                    self.report(PersistenceError::Malformed(e.to_string()));
                    TodoList::new()
                }
            },
            Ok(None) => TodoList::new(),
            Err(e) => {
                self.report(PersistenceError::Read(e.to_string()));
                TodoList::new()
            }
        };

        let mut state = self.state.lock().await;
        state.list = list.clone();
        state.revision += 1;
        *persisted = state.revision;

        tracing::debug!(key = %self.key, items = list.len(), "Loaded todo list");
        list
    }

    /// Snapshot of the current in-memory list
    pub async fn items(&self) -> TodoList {
        self.state.lock().await.list.clone()
    }

    pub async fn get(&self, id: &str) -> Option<TodoItem> {
        self.state.lock().await.list.get(id).cloned()
    }

    /// Append a new, not yet completed item.
    ///
    /// Text that is empty after trimming is rejected with
    /// [`TodoError::EmptyText`] and nothing is written.
    pub async fn add(&self, text: &str) -> Result<TodoList> {
        if text.trim().is_empty() {
            return Err(TodoError::EmptyText);
        }

        let (snapshot, revision) = {
            let mut state = self.state.lock().await;
            let id = self.fresh_id(&state.list)?;
            tracing::debug!(id = %id, "Adding todo");

            state.list.push(TodoItem::new(id, text));
            state.revision += 1;
            (state.list.clone(), state.revision)
        };

        self.persist(revision).await;
        Ok(snapshot)
    }

    /// Remove the item with `id`. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> TodoList {
        self.mutate("remove", id, |list| list.remove(id).is_some()).await
    }

    /// Flip the completion flag of the item with `id`. Unknown ids are a no-op.
    pub async fn toggle_complete(&self, id: &str) -> TodoList {
        self.mutate("toggle_complete", id, |list| list.toggle_complete(id)).await
    }

    /// Replace the text of the item with `id`.
    ///
    /// A missing or empty `new_text` (a cancelled edit) leaves the list alone,
    /// as does an unknown id.
    pub async fn edit(&self, id: &str, new_text: Option<&str>) -> TodoList {
        match new_text {
            Some(text) if !text.is_empty() => {
                self.mutate("edit", id, |list| list.edit(id, text)).await
            }
            _ => {
                tracing::debug!(id = %id, "Edit cancelled, keeping current text");
                self.items().await
            }
        }
    }

    async fn mutate<F>(&self, op: &'static str, id: &str, apply: F) -> TodoList
    where
        F: FnOnce(&mut TodoList) -> bool,
    {
        let (snapshot, revision, changed) = {
            let mut state = self.state.lock().await;
            let changed = apply(&mut state.list);
            if changed {
                state.revision += 1;
            }
            (state.list.clone(), state.revision, changed)
        };

        if changed {
            tracing::debug!(op, id = %id, revision, "Applied todo change");
            self.persist(revision).await;
        } else {
            tracing::debug!(op, id = %id, "Nothing changed, skipping write-back");
        }
        snapshot
    }

    fn fresh_id(&self, list: &TodoList) -> Result<String> {
        let mut id = self.ids.next_id();
        for _ in 1..MAX_ID_ATTEMPTS {
            if !list.contains(&id) {
                return Ok(id);
            }
            tracing::warn!(id = %id, "Generated id already in use, retrying");
            id = self.ids.next_id();
        }
        if list.contains(&id) {
            return Err(TodoError::DuplicateId(id));
        }
        Ok(id)
    }

    /// Make sure the backing store holds `revision` or something newer.
    async fn persist(&self, revision: u64) {
        let mut persisted = self.writer.lock().await;
        if *persisted >= revision {
            tracing::debug!(revision, persisted = *persisted, "Write superseded");
            return;
        }

        let (snapshot, latest) = {
            let state = self.state.lock().await;
            (state.list.clone(), state.revision)
        };

        match self.write(&snapshot).await {
            Ok(()) => {
                tracing::debug!(key = %self.key, revision = latest, "Persisted todo list");
                *persisted = latest;
            }
            Err(e) => self.report(PersistenceError::Write(e.to_string())),
        }
    }

    async fn write(&self, list: &TodoList) -> Result<()> {
        let json = serde_json::to_string(list)?;
        self.storage.set(&self.key, &json).await?;
        Ok(())
    }

    fn report(&self, error: PersistenceError) {
        tracing::error!(key = %self.key, "{}", error);
        // No subscribers is fine; the error has been logged
        let _ = self.errors.send(error);
    }
}

/// Keep the first occurrence of every id
fn dedup_ids(list: TodoList) -> TodoList {
    let total = list.len();
    let mut seen = HashSet::new();
    let items: Vec<TodoItem> = Vec::from(list)
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    if items.len() != total {
        tracing::warn!(
            dropped = total - items.len(),
            "Stored todo list contained duplicate ids"
        );
    }
    TodoList::from(items)
}
