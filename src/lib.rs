//! # bookshelf
//!
//! A small JSON service over an in-memory list of books, served by a
//! minimal hyper-based framework that lives in the same crate.
//!
//! ## Routes
//!
//! - `GET /books/{id}` and `GET /books?id=<id>` look a book up by id.
//! - `POST /books` accepts a JSON object with a string `id` and echoes it back,
//!   or rejects a duplicate id.
//!
//! See [`api`] for status codes and messages.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bookshelf::{AppState, BookStore, Server, Settings, api};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = Settings::from_env();
//!     let state = Arc::new(AppState { books: BookStore::seeded(), persist_creates: false });
//!
//!     Server::bind(settings.socket_addr())
//!         .body_limit(settings.max_body_bytes)
//!         .serve(api::routes(state))
//!         .await
//!         .unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod books;
pub mod settings;

pub use api::{ApiError, AppState};
pub use books::{Book, BookStore};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{DEFAULT_BODY_LIMIT, Server};
pub use settings::Settings;
pub use status::Status;
