//! Book routes.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /books/{id}` | `200` + book | `404 {"message":"Book not found."}` |
//! | `GET /books?id=` | `200` + book | `404 {"message":"Book not found."}` |
//! | `POST /books` | `200` + echoed body | `422 {"message":"Book already exists."}`, `422 {"message":"Can't parse body."}` |
//!
//! Accepted creates are echoed only, unless [`AppState::persist_creates`]
//! is set, in which case they are also appended to the store.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::books::{Book, BookStore};
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;

/// State shared by every book handler.
#[derive(Debug, Default)]
pub struct AppState {
    pub books: BookStore,
    pub persist_creates: bool,
}

/// Client-facing failures. The display text is the `message` sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Book not found.")]
    BookNotFound,
    #[error("Can't parse body.")]
    UnparseableBody,
    #[error("Book already exists.")]
    BookExists,
}

impl ApiError {
    pub fn status(self) -> Status {
        match self {
            Self::BookNotFound => Status::NotFound,
            Self::UnparseableBody | Self::BookExists => Status::UnprocessableContent,
        }
    }
}

#[derive(Serialize)]
struct Message {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(Message { message: self.to_string() })).into_response()
    }
}

/// Registers the book routes over `state`.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .get("/books", with_state(Arc::clone(&state), find_book_by_query))
        .get("/books/{id}", with_state(Arc::clone(&state), find_book_by_path))
        .post("/books", with_state(state, create_book))
}

/// Adapts a `(state, request)` handler into the router's `Fn(Request)` shape.
fn with_state<F, Fut>(state: Arc<AppState>, handler: F) -> impl Fn(Request) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
{
    move |req| handler(Arc::clone(&state), req)
}

/// `GET /books/{id}`
pub async fn find_book_by_path(state: Arc<AppState>, req: Request) -> Result<Json<Book>, ApiError> {
    debug!(params = ?req.params(), "find book by path");
    lookup(&state.books, req.param("id"))
}

/// `GET /books?id=<id>`. A missing `id` key is a lookup miss.
pub async fn find_book_by_query(state: Arc<AppState>, req: Request) -> Result<Json<Book>, ApiError> {
    lookup(&state.books, req.query("id").as_deref())
}

fn lookup(books: &BookStore, id: Option<&str>) -> Result<Json<Book>, ApiError> {
    id.and_then(|id| books.find_by_id(id))
        .map(Json)
        .ok_or(ApiError::BookNotFound)
}

/// `POST /books`
pub async fn create_book(state: Arc<AppState>, req: Request) -> Result<Json<Map<String, Value>>, ApiError> {
    let NewBook { id, body } = NewBook::parse(req.body())?;

    if state.persist_creates {
        let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or_default().to_owned();
        if !state.books.insert_if_absent(Book::new(id.as_str(), field("author"), field("title"))) {
            return Err(ApiError::BookExists);
        }
    } else if state.books.find_by_id(&id).is_some() {
        return Err(ApiError::BookExists);
    }

    info!(%id, persisted = state.persist_creates, "book accepted");
    Ok(Json(body))
}

/// A create payload: a JSON object with a string `id`. Other keys are kept
/// as sent, in order, without validation. An `id` that is present but not a
/// string, such as a number or `null`, makes the body unparseable.
struct NewBook {
    id: String,
    body: Map<String, Value>,
}

impl NewBook {
    fn parse(bytes: &[u8]) -> Result<Self, ApiError> {
        let body: Map<String, Value> =
            serde_json::from_slice(bytes).map_err(|_| ApiError::UnparseableBody)?;
        match body.get("id") {
            Some(Value::String(id)) => Ok(Self { id: id.clone(), body }),
            _ => Err(ApiError::UnparseableBody),
        }
    }
}
