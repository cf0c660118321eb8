//! HTTP server and graceful shutdown.
//!
//! On SIGTERM or Ctrl-C the accept loop stops, every in-flight connection
//! task runs to completion, and [`Server::serve`] returns.
//!
//! Request bodies are read up to a configurable limit. `OPTIONS` on a routed path
//! answers `200` with the `allow` header; other unrouted methods get `405`.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Lookup, Router};
use crate::status::Status;

/// Largest request body read by default, in bytes.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// The HTTP server.
pub struct Server {
    bind: Bind,
    body_limit: usize,
}

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { bind: Bind::Addr(addr), body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Serves on an already-bound listener, e.g. one on port 0.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { bind: Bind::Listener(listener), body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Request bodies longer than `bytes` are answered with `413` before
    /// any handler runs.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Accepts connections and dispatches them through `router` until
    /// SIGTERM or Ctrl-C, followed by a full drain.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let local_addr = listener.local_addr()?;
        let router = Arc::new(router);
        let body_limit = self.body_limit;
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        info!(addr = %local_addr, body_limit, "bookshelf listening");

        loop {
            tokio::select! {
                // Shutdown wins over queued accepts.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req, remote_addr, body_limit).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("bookshelf stopped");
        Ok(())
    }
}

/// Routes one request and produces one response. Every failure is turned
/// into a status code here, so hyper never sees an error.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
    body_limit: usize,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let path = parts.uri.path().to_owned();

    let response = match parts.method.as_str().parse::<Method>() {
        Err(()) => Response::status(Status::MethodNotAllowed),
        Ok(method) => match router.lookup(method, &path) {
            Lookup::Found(handler, params) => match Limited::new(body, body_limit).collect().await {
                Ok(collected) => {
                    let req = Request::new(method, &parts.uri, parts.headers, collected.to_bytes(), params);
                    handler.call(req).await
                }
                Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                    warn!(peer = %remote_addr, body_limit, "request body over limit");
                    Response::status(Status::ContentTooLarge)
                }
                Err(e) => {
                    warn!(peer = %remote_addr, "failed to read request body: {e}");
                    Response::status(Status::BadRequest)
                }
            },
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
                let status = if method == Method::Options { Status::Ok } else { Status::MethodNotAllowed };
                Response::builder()
                    .status(status)
                    .header("allow", &allow)
                    .no_body()
            }
            Lookup::NotFound => Response::status(Status::NotFound),
        },
    };

    info!(
        peer = %remote_addr,
        method = %parts.method,
        path = %path,
        status = response.status_code(),
        elapsed = ?started.elapsed(),
        "request"
    );

    Ok(response.into_http())
}

/// Resolves on SIGTERM or SIGINT (Ctrl-C only, off Unix). A signal source
/// that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
