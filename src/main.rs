//! bookshelf server.
//!
//! Run with:
//!   RUST_LOG=bookshelf=debug HOST=127.0.0.1 PORT=3000 cargo run
//!
//! Try:
//!   curl http://localhost:3000/books/1
//!   curl 'http://localhost:3000/books?id=2'
//!   curl -X POST http://localhost:3000/books \
//!        -H 'content-type: application/json' \
//!        -d '{"id":"5","author":"Robin Wieruch","title":"The Road to React"}'

use std::process::ExitCode;
use std::sync::Arc;

use bookshelf::{AppState, BookStore, Server, Settings, api};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "bookshelf=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    let state = Arc::new(AppState {
        books: BookStore::seeded(),
        persist_creates: settings.persist_creates,
    });

    info!(
        books = state.books.len(),
        persist_creates = state.persist_creates,
        "store seeded"
    );

    let server = Server::bind(settings.socket_addr()).body_limit(settings.max_body_bytes);
    match server.serve(api::routes(state)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
