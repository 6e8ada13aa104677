use std::sync::Arc;

use tracing::{info, warn};

use super::notifier::Notifier;
use super::store::{Intent, Store};
use crate::domain::cover::CoverFile;
use crate::domain::remote::{ApiError, ApiResult, TodoApi};
use crate::domain::todo::{ListFilter, NewTodo, Todo, TodoId, TodoUpdate};

/// Anything that accepts intents. [`Store`] is the production target.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, intent: Intent);
}

impl Dispatch for Store {
    fn dispatch(&self, intent: Intent) { Store::dispatch(self, intent) }
}

/// Request/response wrappers that keep the store in step with the remote API.
///
/// Every action dispatches `LoadingStarted`, performs its remote call(s), dispatches
/// its success intent or reports the failure, and finally dispatches `LoadingEnded`.
/// Failures never escape: each action resolves to `true` on success, `false` otherwise.
pub struct SyncActions<A: TodoApi, N: Notifier, D: Dispatch = Store> {
    api: Arc<A>,
    notifier: Arc<N>,
    dispatcher: Arc<D>,
}

impl<A: TodoApi, N: Notifier, D: Dispatch> Clone for SyncActions<A, N, D> {
    fn clone(&self) -> Self {
        Self { api: self.api.clone(), notifier: self.notifier.clone(), dispatcher: self.dispatcher.clone() }
    }
}

impl<A: TodoApi, N: Notifier, D: Dispatch> SyncActions<A, N, D> {
    pub fn new(api: A, notifier: N, dispatcher: D) -> Self {
        Self { api: Arc::new(api), notifier: Arc::new(notifier), dispatcher: Arc::new(dispatcher) }
    }

    pub fn with_shared(api: Arc<A>, notifier: Arc<N>, dispatcher: Arc<D>) -> Self { Self { api, notifier, dispatcher } }

    pub fn dispatcher(&self) -> &D { &self.dispatcher }

    pub fn notifier(&self) -> &N { &self.notifier }

    pub async fn list(&self, filter: ListFilter) -> bool {
        let _loading = self.begin();
        let result = self.api.list(filter.as_flag()).await;
        self.settle("list", result, Intent::TodosLoaded)
    }

    pub async fn create(&self, input: NewTodo) -> bool {
        let _loading = self.begin();
        let result = self.api.create(input).await;
        self.settle("create", result, |todo| {
            info!(id = %todo.id, "todo created");
            Intent::TodoCreated(true)
        })
    }

    pub async fn delete(&self, id: TodoId) -> bool {
        let _loading = self.begin();
        let result = self.api.delete(id).await;
        self.settle("delete", result, |()| Intent::TodoDeleted(true))
    }

    pub async fn detail(&self, id: TodoId) -> bool {
        let _loading = self.begin();
        self.dispatcher.dispatch(Intent::DetailRequested(id));
        let result = self.api.get(id).await;
        self.settle("detail", result, Intent::DetailLoaded)
    }

    /// Update, then refetch: the update response is not taken as the post-update state.
    pub async fn edit(&self, id: TodoId, input: TodoUpdate) -> bool {
        let _loading = self.begin();
        let result: ApiResult<Todo> = async {
            self.api.update(id, input).await?;
            self.api.get(id).await
        }
        .await;
        self.settle("edit", result, Intent::DetailLoaded)
    }

    pub async fn change_cover(&self, id: TodoId, cover: CoverFile) -> bool {
        let _loading = self.begin();
        let result = self.api.change_cover(id, cover).await;
        self.settle("change_cover", result, Intent::DetailLoaded)
    }

    fn begin(&self) -> LoadingGuard<D> {
        self.dispatcher.dispatch(Intent::LoadingStarted);
        LoadingGuard { dispatcher: self.dispatcher.clone() }
    }

    fn settle<T>(&self, action: &'static str, result: ApiResult<T>, on_success: impl FnOnce(T) -> Intent) -> bool {
        match result {
            Ok(value) => {
                info!(action, "remote call succeeded");
                self.dispatcher.dispatch(on_success(value));
                true
            }
            Err(err) => {
                self.report(action, &err);
                false
            }
        }
    }

    fn report(&self, action: &'static str, err: &ApiError) {
        warn!(action, error = %err, "remote call failed");
        self.notifier.error(&err.message);
        self.dispatcher.dispatch(Intent::ErrorReported(err.message.clone()));
    }
}

/// Dispatches `LoadingEnded` when dropped, so a dropped or finished action always clears it.
struct LoadingGuard<D: Dispatch> {
    dispatcher: Arc<D>,
}

impl<D: Dispatch> Drop for LoadingGuard<D> {
    fn drop(&mut self) { self.dispatcher.dispatch(Intent::LoadingEnded) }
}
