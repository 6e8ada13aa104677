use async_trait::async_trait;
use thiserror::Error;

use super::cover::CoverFile;
use super::todo::{NewTodo, Todo, TodoId, TodoSummary, TodoUpdate};

/// Any failed remote operation. Network, validation and not-found failures are not told apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError { pub message: String }

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    /// `filter` is the completion flag to match, `None` for every task.
    async fn list(&self, filter: Option<bool>) -> ApiResult<Vec<TodoSummary>>;
    async fn get(&self, id: TodoId) -> ApiResult<Todo>;
    async fn create(&self, input: NewTodo) -> ApiResult<Todo>;
    /// The response body is not trusted; callers refetch with [`TodoApi::get`].
    async fn update(&self, id: TodoId, input: TodoUpdate) -> ApiResult<()>;
    async fn delete(&self, id: TodoId) -> ApiResult<()>;
    async fn change_cover(&self, id: TodoId, cover: CoverFile) -> ApiResult<Todo>;
}
