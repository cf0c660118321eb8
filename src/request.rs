//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Uri};

use crate::method::Method;

/// An incoming request with its body already collected.
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        uri: &Uri,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers,
            body,
            params,
        }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Case-insensitive header lookup. Non-ASCII values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For the route `/books/{id}`, `req.param("id")` on `/books/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first percent-decoded value of a query-string key.
    ///
    /// `/books?id=2` gives `req.query("id") == Some("2".into())`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

#[cfg(test)]
impl Request {
    /// Builds a request the way the server would after routing.
    pub(crate) fn test(
        method: Method,
        uri: &str,
        body: &'static [u8],
        params: &[(&str, &str)],
    ) -> Self {
        let uri: Uri = uri.parse().expect("test uri");
        let params = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Self::new(method, &uri, HeaderMap::new(), Bytes::from_static(body), params)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/books?id=1", Some("1"))]
    #[case("/books?title=x&id=2&id=3", Some("2"))]
    #[case("/books?id=a%20b", Some("a b"))]
    #[case("/books?id=", Some(""))]
    #[case("/books?other=1", None)]
    #[case("/books", None)]
    fn query_returns_first_decoded_value(#[case] uri: &str, #[case] expected: Option<&str>) {
        let req = Request::test(Method::Get, uri, b"", &[]);
        assert_eq!(req.query("id").as_deref(), expected);
        assert_eq!(req.path(), "/books");
    }

    #[test]
    fn param_and_header_lookups() {
        let mut req = Request::test(Method::Get, "/books/7", b"", &[("id", "7")]);
        req.headers.insert("content-type", "application/json".parse().expect("header"));

        assert_eq!(req.param("id"), Some("7"));
        assert_eq!(req.param("missing"), None);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.method(), Method::Get);
    }
}
