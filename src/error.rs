//! Infrastructure error type.

use std::fmt;

/// The error returned by [`Server::serve`](crate::Server::serve).
///
/// Lookup misses and rejected payloads never show up here: those are
/// [`ApiError`](crate::api::ApiError)s, rendered straight into a
/// [`Response`](crate::Response). This type only carries socket failures:
/// binding the listener or reading its local address.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_io_and_keeps_source() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken"));
        assert_eq!(err.to_string(), "io: port taken");
        assert!(std::error::Error::source(&err).is_some());
    }
}
