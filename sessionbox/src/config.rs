//! Session and cache configuration.
//!
//! All types deserialize with serde, durations are written in humantime
//! notation:
//!
//! ```yaml
//! timeout:
//!   connect: 500ms
//!   read: 3s
//! headers:
//!   user-agent: feeds/1.0
//! ```

use std::time::Duration;

use http::{HeaderMap, HeaderValue, header::IntoHeaderName};
use serde::{Deserialize, Serialize};

/// Connect and read timeout pair applied to every request.
///
/// The whole exchange, body included, is additionally bounded by
/// [`Timeout::total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeout {
    /// Time allowed to establish the connection.
    #[serde(with = "humantime_serde")]
    pub connect: Duration,
    /// Time allowed between reads once connected.
    #[serde(with = "humantime_serde")]
    pub read: Duration,
}

impl Timeout {
    /// Creates a timeout pair.
    pub const fn new(connect: Duration, read: Duration) -> Self {
        Self { connect, read }
    }

    /// Upper bound of a whole request.
    pub fn total(&self) -> Duration {
        self.connect.saturating_add(self.read)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(500),
            read: Duration::from_secs(3),
        }
    }
}

impl From<(Duration, Duration)> for Timeout {
    fn from((connect, read): (Duration, Duration)) -> Self {
        Self::new(connect, read)
    }
}

/// Construction parameters shared by every session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Default timeout pair.
    pub timeout: Timeout,
    /// Headers merged into every request.
    #[serde(with = "http_serde::header_map")]
    pub headers: HeaderMap,
}

impl SessionConfig {
    /// Sets the default timeout pair.
    pub fn timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Adds a default header, replacing any previous value for `name`.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all default headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Behavior of the response cache layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Bound on every store operation. A slower store is skipped.
    #[serde(with = "humantime_serde")]
    pub backend_timeout: Duration,
    /// How long responses carrying an `ETag` or `Last-Modified` validator are
    /// kept for revalidation once stale.
    #[serde(with = "humantime_serde")]
    pub validator_ttl: Duration,
    /// Shared cache semantics (`private` responses are not stored, `s-maxage`
    /// applies). Off by default: a session is a private client cache.
    pub shared: bool,
    /// Namespace prepended to every cache key.
    pub key_prefix: String,
    /// Bump to invalidate every entry written by previous versions.
    pub key_version: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_millis(500),
            validator_ttl: Duration::from_secs(14 * 24 * 60 * 60),
            shared: false,
            key_prefix: "sessionbox".to_owned(),
            key_version: 0,
        }
    }
}
