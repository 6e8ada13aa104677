use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::{Deserialize, Serialize};

use crate::domain::todo::{Todo, TodoId, TodoSummary};

/// A requested state transition. Only [`reduce`] interprets these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    LoadingStarted,
    LoadingEnded,
    TodosLoaded(Vec<TodoSummary>),
    /// Navigation to a detail; the held detail is dropped until the fetch answers.
    DetailRequested(TodoId),
    DetailLoaded(Todo),
    TodoCreated(bool),
    TodoDeleted(bool),
    ErrorReported(String),
    ErrorDismissed,
}

impl Intent {
    /// Whether the intent touches task data (list, detail or the create/delete markers).
    pub fn mutates_data(&self) -> bool {
        matches!(self, Intent::TodosLoaded(_) | Intent::DetailLoaded(_) | Intent::TodoCreated(_) | Intent::TodoDeleted(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub todos: Vec<TodoSummary>,
    pub detail: Option<Todo>,
    pub viewing: Option<TodoId>,
    pub in_flight: u32,
    pub last_error: Option<String>,
    pub created: bool,
    pub deleted: bool,
}

impl Snapshot {
    pub fn is_loading(&self) -> bool { self.in_flight > 0 }

    /// The detail only when it belongs to the task being viewed.
    pub fn current_detail(&self) -> Option<&Todo> {
        self.detail.as_ref().filter(|todo| self.viewing.is_none_or(|id| id == todo.id))
    }
}

pub fn reduce(prev: &Snapshot, intent: Intent) -> Snapshot {
    let mut next = prev.clone();
    match intent {
        Intent::LoadingStarted => next.in_flight = next.in_flight.saturating_add(1),
        Intent::LoadingEnded => next.in_flight = next.in_flight.saturating_sub(1),
        Intent::TodosLoaded(todos) => next.todos = todos,
        Intent::DetailRequested(id) => {
            next.viewing = Some(id);
            // Even for the same id: a failed refetch must not keep a task the server dropped.
            next.detail = None;
        }
        Intent::DetailLoaded(todo) => {
            if next.viewing.is_none_or(|id| id == todo.id) { next.detail = Some(todo); }
        }
        Intent::TodoCreated(flag) => next.created = flag,
        Intent::TodoDeleted(flag) => next.deleted = flag,
        Intent::ErrorReported(message) => next.last_error = Some(message),
        Intent::ErrorDismissed => next.last_error = None,
    }
    next
}

type Listener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

struct Inner {
    /// Held across reduce and notify so listeners observe snapshots in dispatch order.
    dispatching: Mutex<()>,
    state: Mutex<Arc<Snapshot>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: Mutex<u64>,
}

/// Shared container for the application snapshot. Clones share state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Default for Store {
    fn default() -> Self { Self::new(Snapshot::default()) }
}

impl Store {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatching: Mutex::new(()),
                state: Mutex::new(Arc::new(initial)),
                listeners: Mutex::new(Vec::new()),
                next_listener: Mutex::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> { lock(&self.inner.state).clone() }

    /// Applies `intent` atomically, then calls every listener with the new snapshot.
    /// Listeners run on the dispatching thread and must not dispatch themselves.
    pub fn dispatch(&self, intent: Intent) {
        tracing::trace!(?intent, "dispatch");
        let _ordered = lock(&self.inner.dispatching);
        let next = {
            let mut state = lock(&self.inner.state);
            let next = Arc::new(reduce(&state, intent));
            *state = next.clone();
            next
        };
        let listeners: Vec<Listener> = lock(&self.inner.listeners).iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners { listener(&next); }
    }

    pub fn subscribe(&self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut counter = lock(&self.inner.next_listener);
            *counter += 1;
            *counter
        };
        let listener: Listener = Arc::new(listener);
        lock(&self.inner.listeners).push((id, listener));
        Subscription { id, store: Arc::downgrade(&self.inner) }
    }
}

/// Removes its listener when dropped or on [`Subscription::unsubscribe`].
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

// Poisoning is ignored: the snapshot is swapped whole, never half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
