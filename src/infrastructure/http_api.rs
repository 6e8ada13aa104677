use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::cover::CoverFile;
use crate::domain::remote::{ApiError, ApiResult, TodoApi};
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoSummary, TodoUpdate};

/// `{ "success": bool, "message": string, "data": ... }`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

fn default_success() -> bool { true }

#[derive(Debug, Deserialize)]
struct TodosData { todos: Vec<TodoSummary> }

#[derive(Debug, Deserialize)]
struct TodoData {
    #[serde(default)]
    todo: Option<Todo>,
    #[serde(default)]
    todo_id: Option<TodoId>,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self { ApiError::new(err.to_string()) }
}

/// [`TodoApi`] over HTTP+JSON.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTodoApi {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http, base_url: config.base_url.clone(), token: config.token.clone() })
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}", path.trim_start_matches('/'))).map_err(|e| ApiError::new(format!("invalid url: {e}")))
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!(%method, %url, "request");
        let req = self.http.request(method, url);
        Ok(match &self.token { Some(token) => req.bearer_auth(token), None => req })
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<Option<T>> {
        let res = req.send().await?;
        read_envelope(res).await
    }

    async fn fetch_todo(&self, id: TodoId) -> ApiResult<Todo> {
        let data: Option<TodoData> = self.send(self.request(Method::GET, &format!("todos/{id}"))?).await?;
        data.and_then(|d| d.todo).ok_or_else(|| ApiError::new("response did not include the todo"))
    }

    /// Uses the echoed todo when present, otherwise fetches `fallback_id`.
    ///
    /// A create answered with neither `todo` nor `todo_id` is a hard failure: the task may
    /// exist on the server, but nothing identifies it, and the next list refresh shows it.
    async fn resolve(&self, data: Option<TodoData>, fallback_id: Option<TodoId>) -> ApiResult<Todo> {
        match data {
            Some(TodoData { todo: Some(todo), .. }) => Ok(todo),
            Some(TodoData { todo_id: Some(id), .. }) => self.fetch_todo(id).await,
            _ => match fallback_id {
                Some(id) => self.fetch_todo(id).await,
                None => Err(ApiError::new(UNIDENTIFIED_CREATE)),
            },
        }
    }
}

const REQUEST_FAILED: &str = "request failed";
const UNIDENTIFIED_CREATE: &str = "todo saved but the response did not identify it";

async fn read_envelope<T: DeserializeOwned>(res: Response) -> ApiResult<Option<T>> {
    let status = res.status();
    let body = res.bytes().await?;
    decode_envelope(status, &body)
}

/// Maps a response to its `data`, or to the most specific error message available.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> ApiResult<Option<T>> {
    let message = match serde_json::from_slice::<Envelope<T>>(body) {
        Ok(env) if status.is_success() && env.success => return Ok(env.data),
        Ok(env) => env.message,
        Err(err) if status.is_success() => return Err(ApiError::new(format!("invalid response: {err}"))),
        Err(_) => serde_json::from_slice::<Envelope<IgnoredAny>>(body).map(|env| env.message).unwrap_or_default(),
    };
    if !message.is_empty() { return Err(ApiError::new(message)); }
    // Never surface a 2xx reason phrase as the error.
    if status.is_success() { return Err(ApiError::new(REQUEST_FAILED)); }

    // Error bodies are not always envelopes; fall back to a plain-text message.
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() || text.starts_with('{') {
        Err(ApiError::new(status.canonical_reason().unwrap_or(REQUEST_FAILED)))
    } else {
        Err(ApiError::new(text))
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self, filter: Option<bool>) -> ApiResult<Vec<TodoSummary>> {
        let mut req = self.request(Method::GET, "todos")?;
        if let Some(done) = filter { req = req.query(&[("is_finished", u8::from(done))]); }
        let data: Option<TodosData> = self.send(req).await?;
        Ok(data.map(|d| d.todos).unwrap_or_default())
    }

    async fn get(&self, id: TodoId) -> ApiResult<Todo> { self.fetch_todo(id).await }

    async fn create(&self, input: NewTodo) -> ApiResult<Todo> {
        let data: Option<TodoData> = self.send(self.request(Method::POST, "todos")?.json(&input)).await?;
        self.resolve(data, None).await
    }

    async fn update(&self, id: TodoId, input: TodoUpdate) -> ApiResult<()> {
        let _: Option<IgnoredAny> = self.send(self.request(Method::PUT, &format!("todos/{id}"))?.json(&input)).await?;
        Ok(())
    }

    async fn delete(&self, id: TodoId) -> ApiResult<()> {
        let _: Option<IgnoredAny> = self.send(self.request(Method::DELETE, &format!("todos/{id}"))?).await?;
        Ok(())
    }

    async fn change_cover(&self, id: TodoId, cover: CoverFile) -> ApiResult<Todo> {
        let part = multipart::Part::bytes(cover.bytes).file_name(cover.file_name).mime_str(cover.mime)?;
        let form = multipart::Form::new().part("cover", part);
        let data: Option<TodoData> = self.send(self.request(Method::POST, &format!("todos/{id}/cover"))?.multipart(form)).await?;
        self.resolve(data, Some(id)).await
    }
}
