//! Process settings read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | interface to bind |
//! | `PORT` | `3000` | port to bind |
//! | `BOOKS_PERSIST_CREATES` | `false` | append accepted `POST /books` records to the store |
//! | `MAX_BODY_BYTES` | `1048576` | largest request body read; longer ones get `413` |
//!
//! Loading never fails: a missing value takes its default silently, a
//! malformed one takes its default with a warning.

use std::fmt::Debug;
use std::net::{SocketAddr, ToSocketAddrs};

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::server::DEFAULT_BODY_LIMIT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub persist_creates: bool,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            persist_creates: false,
            max_body_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        match config::Config::builder()
            .add_source(config::Environment::default())
            .build()
        {
            Ok(source) => Self::from_config(&source),
            Err(e) => {
                warn!("failed to read environment, using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Reads settings from an already-built source. Keys are lowercase.
    pub fn from_config(source: &config::Config) -> Self {
        let defaults = Self::default();
        Self {
            host: read(source, "host", defaults.host),
            port: read(source, "port", defaults.port),
            persist_creates: read(source, "books_persist_creates", defaults.persist_creates),
            max_body_bytes: read(source, "max_body_bytes", defaults.max_body_bytes),
        }
    }

    /// Resolves `host:port`, falling back to `0.0.0.0:<port>` when the host
    /// is neither an IP literal nor a resolvable name.
    pub fn socket_addr(&self) -> SocketAddr {
        let fallback = SocketAddr::from(([0, 0, 0, 0], self.port));
        match (self.host.as_str(), self.port).to_socket_addrs() {
            Ok(mut addrs) => addrs.next().unwrap_or_else(|| {
                warn!(host = %self.host, "host resolved to no addresses, binding {fallback}");
                fallback
            }),
            Err(e) => {
                warn!(host = %self.host, "cannot resolve host ({e}), binding {fallback}");
                fallback
            }
        }
    }
}

fn read<T: DeserializeOwned + Debug>(source: &config::Config, key: &str, default: T) -> T {
    match source.get::<T>(key) {
        Ok(value) => value,
        Err(config::ConfigError::NotFound(_)) => default,
        Err(e) => {
            warn!(key, ?default, "invalid setting, using default: {e}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> config::Config {
        pairs
            .iter()
            .fold(config::Config::builder(), |builder, (k, v)| {
                builder.set_override(*k, *v).expect("override")
            })
            .build()
            .expect("build")
    }

    #[test]
    fn empty_source_gives_defaults() {
        assert_eq!(Settings::from_config(&source(&[])), Settings::default());
    }

    #[test]
    fn reads_all_keys() {
        let settings = Settings::from_config(&source(&[
            ("host", "127.0.0.1"),
            ("port", "8080"),
            ("books_persist_creates", "true"),
            ("max_body_bytes", "4096"),
        ]));
        assert_eq!(
            settings,
            Settings {
                host: "127.0.0.1".into(),
                port: 8080,
                persist_creates: true,
                max_body_bytes: 4096,
            }
        );
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("3000x")]
    fn malformed_port_falls_back(#[case] port: &str) {
        assert_eq!(Settings::from_config(&source(&[("port", port)])).port, 3000);
    }

    #[test]
    fn malformed_body_limit_falls_back() {
        let settings = Settings::from_config(&source(&[("max_body_bytes", "1MB")]));
        assert_eq!(settings.max_body_bytes, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn malformed_flag_falls_back() {
        let settings = Settings::from_config(&source(&[("books_persist_creates", "maybe")]));
        assert!(!settings.persist_creates);
    }

    #[test]
    fn socket_addr_uses_ip_literal() {
        let settings = Settings { host: "127.0.0.1".into(), port: 4000, ..Settings::default() };
        assert_eq!(settings.socket_addr(), "127.0.0.1:4000".parse().expect("addr"));
    }

    #[test]
    fn unresolvable_host_binds_all_interfaces() {
        let settings = Settings { host: "not a host".into(), port: 4000, ..Settings::default() };
        assert_eq!(settings.socket_addr(), "0.0.0.0:4000".parse().expect("addr"));
    }
}
