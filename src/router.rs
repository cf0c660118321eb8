//! Radix-tree request router.
//!
//! One tree per HTTP method. A path that exists under some other method is
//! reported separately so the server can answer `405`, or `OPTIONS`, with an
//! `allow` header. Captured path parameters are percent-decoded.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// The application router. Build it once at startup; pass it to
/// [`Server::serve`](crate::Server::serve).
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

/// Outcome of matching a method and path against the routing table.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path is routed, just not for this method. Sorted, always
    /// includes `OPTIONS`.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and are read with
    /// [`Request::param`](crate::Request::param).
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.insert(method, path, handler.into_boxed_handler())
    }

    /// Registers `handler` for both `GET` and `HEAD`. hyper strips the body
    /// from `HEAD` responses.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        self.insert(Method::Get, path, Arc::clone(&handler))
            .insert(Method::Head, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    fn insert(mut self, method: Method, path: &str, handler: BoxedHandler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// A parameter that is not UTF-8 once decoded is left out, so the
    /// handler sees it as absent.
    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(&method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .filter_map(|(k, v)| match percent_decode_str(v).decode_utf8() {
                    Ok(decoded) => Some((k.to_owned(), decoded.into_owned())),
                    Err(_) => {
                        debug!(param = k, raw = v, "path parameter is not UTF-8 after decoding");
                        None
                    }
                })
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        if !allowed.contains(&Method::Options) {
            allowed.push(Method::Options);
        }
        allowed.sort();
        Lookup::MethodNotAllowed(allowed)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Status};

    async fn ok(_req: Request) -> Status { Status::Ok }

    fn app() -> Router {
        Router::new()
            .get("/books", ok)
            .get("/books/{id}", ok)
            .post("/books", ok)
    }

    #[test]
    fn captures_path_params() {
        match app().lookup(Method::Get, "/books/42") {
            Lookup::Found(_, params) => assert_eq!(params.get("id").map(String::as_str), Some("42")),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn path_params_are_percent_decoded() {
        let id = |path: &str| match app().lookup(Method::Get, path) {
            Lookup::Found(_, params) => params.get("id").cloned(),
            _ => panic!("expected a match for {path}"),
        };
        assert_eq!(id("/books/%31").as_deref(), Some("1"));
        assert_eq!(id("/books/a%20b").as_deref(), Some("a b"));
        assert_eq!(id("/books/a+b").as_deref(), Some("a+b"));
        assert_eq!(id("/books/%FF"), None);
    }

    #[test]
    fn get_routes_also_answer_head() {
        assert!(matches!(app().lookup(Method::Head, "/books/1"), Lookup::Found(..)));
        assert!(matches!(app().lookup(Method::Head, "/books"), Lookup::Found(..)));
    }

    #[test]
    fn reports_allowed_methods_for_known_path() {
        match app().lookup(Method::Delete, "/books") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(
                allowed,
                vec![Method::Get, Method::Head, Method::Options, Method::Post]
            ),
            _ => panic!("expected 405"),
        }
        match app().lookup(Method::Options, "/books/1") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, vec![Method::Get, Method::Head, Method::Options])
            }
            _ => panic!("expected 405"),
        }
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert!(matches!(app().lookup(Method::Get, "/authors"), Lookup::NotFound));
        assert!(matches!(app().lookup(Method::Get, "/books/1/extra"), Lookup::NotFound));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new().get("/books/{id}", ok).get("/books/{name}", ok);
    }
}
