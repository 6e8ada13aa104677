use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{oneshot, Notify};

use super::notifier::RecordingNotifier;
use super::store::{Intent, Snapshot, Store};
use super::sync_actions::{Dispatch, SyncActions};
use crate::domain::cover::CoverFile;
use crate::domain::remote::{ApiError, ApiResult, TodoApi};
use crate::domain::todo::{ListFilter, NewTodo, Todo, TodoId, TodoSummary, TodoUpdate};

#[derive(Default)]
struct InMemoryApi {
    items: Mutex<BTreeMap<i64, Todo>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, String>>,
    gates: Mutex<HashMap<i64, oneshot::Receiver<()>>>,
    parked: Notify,
}

impl InMemoryApi {
    fn with(todos: Vec<Todo>) -> Self {
        let api = Self::default();
        api.items.lock().unwrap().extend(todos.into_iter().map(|t| (t.id.0, t)));
        api
    }

    fn fail(&self, op: &'static str, message: &str) { self.failures.lock().unwrap().insert(op, message.to_string()); }

    /// `get(id)` waits for the returned sender before answering.
    fn gate(&self, id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(id, rx);
        tx
    }

    fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

    fn enter(&self, op: &'static str, detail: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(format!("{op} {detail}").trim_end().to_string());
        match self.failures.lock().unwrap().get(op) {
            Some(message) => Err(ApiError::new(message.clone())),
            None => Ok(()),
        }
    }

    fn find(&self, id: TodoId) -> ApiResult<Todo> {
        self.items.lock().unwrap().get(&id.0).cloned().ok_or_else(|| ApiError::new("Not found"))
    }
}

#[async_trait]
impl TodoApi for InMemoryApi {
    async fn list(&self, filter: Option<bool>) -> ApiResult<Vec<TodoSummary>> {
        self.enter("list", filter.map(|f| f.to_string()).unwrap_or_default())?;
        let items = self.items.lock().unwrap();
        Ok(items.values().filter(|t| filter.is_none_or(|f| t.is_finished == f)).map(Todo::summary).collect())
    }

    async fn get(&self, id: TodoId) -> ApiResult<Todo> {
        self.enter("get", id.to_string())?;
        let gate = self.gates.lock().unwrap().remove(&id.0);
        if let Some(rx) = gate {
            self.parked.notify_one();
            let _ = rx.await;
        }
        self.find(id)
    }

    async fn create(&self, input: NewTodo) -> ApiResult<Todo> {
        self.enter("create", input.title.clone())?;
        let mut items = self.items.lock().unwrap();
        let id = TodoId(items.keys().max().copied().unwrap_or(0) + 1);
        let todo = Todo { id, title: input.title, description: input.description, is_finished: false, cover: None, created_at: Some(Utc::now()) };
        items.insert(id.0, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: TodoId, input: TodoUpdate) -> ApiResult<()> {
        self.enter("update", id.to_string())?;
        let mut items = self.items.lock().unwrap();
        let todo = items.get_mut(&id.0).ok_or_else(|| ApiError::new("Not found"))?;
        todo.title = input.title;
        todo.description = input.description;
        todo.is_finished = input.is_finished;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> ApiResult<()> {
        self.enter("delete", id.to_string())?;
        self.items.lock().unwrap().remove(&id.0).map(|_| ()).ok_or_else(|| ApiError::new("Not found"))
    }

    async fn change_cover(&self, id: TodoId, cover: CoverFile) -> ApiResult<Todo> {
        self.enter("change_cover", id.to_string())?;
        let mut items = self.items.lock().unwrap();
        let todo = items.get_mut(&id.0).ok_or_else(|| ApiError::new("Not found"))?;
        todo.cover = Some(format!("https://covers.test/{}", cover.file_name));
        Ok(todo.clone())
    }
}

/// Forwards to a real store and keeps the intents it saw.
#[derive(Default)]
struct Recorder {
    store: Store,
    intents: Mutex<Vec<Intent>>,
}

impl Recorder {
    fn intents(&self) -> Vec<Intent> { self.intents.lock().unwrap().clone() }
    fn snapshot(&self) -> Arc<Snapshot> { self.store.snapshot() }
    fn count(&self, intent: &Intent) -> usize { self.intents().iter().filter(|i| *i == intent).count() }
}

impl Dispatch for Recorder {
    fn dispatch(&self, intent: Intent) {
        self.intents.lock().unwrap().push(intent.clone());
        self.store.dispatch(intent);
    }
}

struct Harness {
    api: Arc<InMemoryApi>,
    notifier: Arc<RecordingNotifier>,
    recorder: Arc<Recorder>,
    actions: SyncActions<InMemoryApi, RecordingNotifier, Recorder>,
}

fn harness(api: InMemoryApi) -> Harness {
    let api = Arc::new(api);
    let notifier = Arc::new(RecordingNotifier::default());
    let recorder = Arc::new(Recorder::default());
    let actions = SyncActions::with_shared(api.clone(), notifier.clone(), recorder.clone());
    Harness { api, notifier, recorder, actions }
}

fn todo(id: i64, title: &str, done: bool) -> Todo {
    Todo { id: TodoId(id), title: title.into(), description: String::new(), is_finished: done, cover: None, created_at: None }
}

fn cover() -> CoverFile { CoverFile::new("cat.png", vec![1, 2, 3]).unwrap() }

#[tokio::test]
async fn every_action_ends_loading_exactly_once() {
    for fail in [false, true] {
        let h = harness(InMemoryApi::with(vec![todo(1, "a", false), todo(2, "b", false)]));
        if fail {
            for op in ["list", "get", "create", "update", "delete", "change_cover"] { h.api.fail(op, "boom"); }
        }
        let a = &h.actions;
        let outcomes = [
            a.list(ListFilter::All).await,
            a.create(NewTodo { title: "c".into(), description: String::new() }).await,
            a.delete(TodoId(2)).await,
            a.detail(TodoId(1)).await,
            a.edit(TodoId(1), TodoUpdate { title: "a2".into(), description: String::new(), is_finished: true }).await,
            a.change_cover(TodoId(1), cover()).await,
        ];
        assert!(outcomes.iter().all(|ok| *ok != fail));
        assert_eq!(h.recorder.count(&Intent::LoadingStarted), 6);
        assert_eq!(h.recorder.count(&Intent::LoadingEnded), 6);
        assert_eq!(h.recorder.intents().last(), Some(&Intent::LoadingEnded));
        assert!(!h.recorder.snapshot().is_loading());
    }
}

#[tokio::test]
async fn failures_never_reach_task_data() {
    let h = harness(InMemoryApi::with(vec![todo(1, "a", false)]));
    for op in ["list", "get", "create", "update", "delete", "change_cover"] { h.api.fail(op, "server unavailable"); }
    h.actions.list(ListFilter::Done).await;
    h.actions.create(NewTodo { title: "x".into(), description: String::new() }).await;
    h.actions.delete(TodoId(1)).await;
    h.actions.detail(TodoId(1)).await;
    h.actions.edit(TodoId(1), TodoUpdate { title: "y".into(), description: String::new(), is_finished: true }).await;
    h.actions.change_cover(TodoId(1), cover()).await;

    assert!(h.recorder.intents().iter().all(|i| !i.mutates_data()));
    assert_eq!(h.notifier.messages().len(), 6);
    assert_eq!(h.api.calls(), vec!["list true", "create x", "delete 1", "get 1", "update 1", "change_cover 1"]);
    assert_eq!(h.recorder.snapshot().last_error.as_deref(), Some("server unavailable"));
}

#[tokio::test]
async fn edit_skips_refetch_when_update_fails() {
    let h = harness(InMemoryApi::with(vec![todo(1, "Buy milk", false)]));
    h.actions.detail(TodoId(1)).await;
    let before = h.recorder.snapshot().detail.clone();
    h.api.fail("update", "Title is required");

    let ok = h.actions.edit(TodoId(1), TodoUpdate { title: String::new(), description: String::new(), is_finished: false }).await;

    assert!(!ok);
    assert_eq!(h.api.calls(), vec!["get 1", "update 1"]);
    assert_eq!(h.recorder.snapshot().detail, before);
    assert_eq!(h.notifier.messages(), vec!["Title is required"]);
}

#[tokio::test]
async fn edit_keeps_detail_when_refetch_fails() {
    let h = harness(InMemoryApi::with(vec![todo(1, "Buy milk", false)]));
    h.actions.detail(TodoId(1)).await;
    let before = h.recorder.snapshot().detail.clone();
    let seen = h.recorder.intents().len();
    h.api.fail("get", "Timeout");

    let ok = h.actions.edit(TodoId(1), TodoUpdate { title: "Buy bread".into(), description: String::new(), is_finished: false }).await;

    assert!(!ok);
    assert_eq!(h.api.calls(), vec!["get 1", "update 1", "get 1"]);
    assert!(h.recorder.intents()[seen..].iter().all(|i| !i.mutates_data()));
    assert_eq!(h.recorder.snapshot().detail, before);
    assert!(!h.recorder.snapshot().is_loading());
    assert_eq!(h.notifier.messages(), vec!["Timeout"]);
}

#[tokio::test]
async fn edit_replaces_detail_with_refetched_task() {
    let h = harness(InMemoryApi::with(vec![todo(1, "Buy milk", false)]));
    let ok = h.actions.edit(TodoId(1), TodoUpdate { title: "Buy milk and bread".into(), description: String::new(), is_finished: true }).await;

    assert!(ok);
    assert_eq!(h.api.calls(), vec!["update 1", "get 1"]);
    let snap = h.recorder.snapshot();
    assert_eq!(snap.detail, Some(todo(1, "Buy milk and bread", true)));
    assert!(!snap.is_loading());
}

#[tokio::test]
async fn rejected_delete_leaves_snapshot_untouched() {
    let h = harness(InMemoryApi::with(vec![todo(1, "Buy milk", false)]));
    h.actions.list(ListFilter::All).await;
    h.api.fail("delete", "Not found");
    let before = h.recorder.snapshot();

    let ok = h.actions.delete(TodoId(1)).await;

    let after = h.recorder.snapshot();
    assert!(!ok);
    assert_eq!(after.todos, before.todos);
    assert_eq!(after.detail, before.detail);
    assert!(!after.deleted);
    assert!(!after.is_loading());
    assert_eq!(after.last_error.as_deref(), Some("Not found"));
    assert_eq!(h.notifier.messages(), vec!["Not found"]);
}

#[tokio::test]
async fn later_detail_request_wins_over_slow_earlier_one() {
    let h = harness(InMemoryApi::with(vec![todo(1, "first", false), todo(2, "second", false)]));
    let release_first = h.api.gate(1);

    let slow = h.actions.detail(TodoId(1));
    let fast = async {
        h.api.parked.notified().await;
        let ok = h.actions.detail(TodoId(2)).await;
        let _ = release_first.send(());
        ok
    };
    let (slow_ok, fast_ok) = tokio::join!(slow, fast);

    assert!(slow_ok && fast_ok);
    let snap = h.recorder.snapshot();
    assert_eq!(snap.viewing, Some(TodoId(2)));
    assert_eq!(snap.current_detail().map(|t| t.title.as_str()), Some("second"));
    assert!(!snap.is_loading());
}

#[tokio::test]
async fn create_and_delete_only_raise_markers() {
    let h = harness(InMemoryApi::with(vec![todo(1, "a", false)]));
    h.actions.list(ListFilter::All).await;

    assert!(h.actions.create(NewTodo { title: "b".into(), description: "later".into() }).await);
    let snap = h.recorder.snapshot();
    assert!(snap.created);
    assert_eq!(snap.todos.len(), 1, "list is refreshed by the caller, not in place");

    assert!(h.actions.delete(TodoId(1)).await);
    assert!(h.recorder.snapshot().deleted);

    h.actions.list(ListFilter::All).await;
    let titles: Vec<_> = h.recorder.snapshot().todos.iter().map(|t| t.title.clone()).collect();
    assert_eq!(titles, vec!["b"]);
}

#[tokio::test]
async fn list_forwards_completion_filter() {
    let h = harness(InMemoryApi::with(vec![todo(1, "a", false), todo(2, "b", true)]));
    h.actions.list(ListFilter::Done).await;
    h.actions.list(ListFilter::Pending).await;
    h.actions.list(ListFilter::All).await;
    assert_eq!(h.api.calls(), vec!["list true", "list false", "list"]);
    assert_eq!(h.recorder.snapshot().todos.len(), 2);
}

#[tokio::test]
async fn unknown_detail_leaves_empty_slot() {
    let h = harness(InMemoryApi::with(vec![todo(1, "a", false)]));
    h.actions.detail(TodoId(1)).await;
    assert!(!h.actions.detail(TodoId(99)).await);
    let snap = h.recorder.snapshot();
    assert_eq!(snap.viewing, Some(TodoId(99)));
    assert_eq!(snap.current_detail(), None);
}

#[tokio::test]
async fn reopening_a_task_removed_on_the_server_empties_the_slot() {
    let h = harness(InMemoryApi::with(vec![todo(1, "Buy milk", false)]));
    assert!(h.actions.detail(TodoId(1)).await);
    h.api.items.lock().unwrap().clear();

    assert!(!h.actions.detail(TodoId(1)).await);

    let snap = h.recorder.snapshot();
    assert_eq!(snap.viewing, Some(TodoId(1)));
    assert_eq!(snap.current_detail(), None);
    assert_eq!(h.notifier.messages(), vec!["Not found"]);
}

#[tokio::test]
async fn cover_change_loads_updated_detail() {
    let h = harness(InMemoryApi::with(vec![todo(1, "a", false)]));
    h.actions.detail(TodoId(1)).await;
    assert!(h.actions.change_cover(TodoId(1), cover()).await);
    let snap = h.recorder.snapshot();
    assert_eq!(snap.detail.as_ref().and_then(|t| t.cover.as_deref()), Some("https://covers.test/cat.png"));
}
