//! Buffered HTTP response returned by sessions.

use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version, response::Parts};
use serde::de::DeserializeOwned;
use url::Url;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// Served from cache without a network call.
    Hit,
    /// Fetched from the network.
    Miss,
    /// Stale cache entry confirmed by a conditional request (`304 Not Modified`).
    Revalidated,
}

impl CacheStatus {
    /// Header value form: `HIT`, `MISS` or `REVALIDATED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Revalidated => "REVALIDATED",
        }
    }
}

/// A fully received HTTP response.
///
/// The body is buffered before the response is handed out, so
/// [`Response::elapsed`] covers the whole exchange.
#[derive(Debug, Clone)]
pub struct Response {
    head: Parts,
    body: Bytes,
    url: Url,
    elapsed: Duration,
    cache_status: CacheStatus,
}

impl Response {
    /// Wraps a buffered response received from `url` after `elapsed`.
    pub fn new(response: http::Response<Bytes>, url: Url, elapsed: Duration) -> Self {
        let (head, body) = response.into_parts();
        Self::from_parts(head, body, url, elapsed)
    }

    pub(crate) fn from_parts(head: Parts, body: Bytes, url: Url, elapsed: Duration) -> Self {
        Self {
            head,
            body,
            url,
            elapsed,
            cache_status: CacheStatus::Miss,
        }
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    /// HTTP version.
    pub fn version(&self) -> Version {
        self.head.version
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.head.headers
    }

    pub(crate) fn head(&self) -> &Parts {
        &self.head
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Wall-clock time spent producing this response.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether and how the cache was involved.
    pub fn cache_status(&self) -> CacheStatus {
        self.cache_status
    }

    /// `true` when the body was served from cache, with or without revalidation.
    pub fn from_cache(&self) -> bool {
        matches!(
            self.cache_status,
            CacheStatus::Hit | CacheStatus::Revalidated
        )
    }

    pub(crate) fn with_cache_status(mut self, cache_status: CacheStatus) -> Self {
        self.cache_status = cache_status;
        self
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn bytes(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Body deserialized from JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Converts into an [`http::Response`].
    pub fn into_http(self) -> http::Response<Bytes> {
        http::Response::from_parts(self.head, self.body)
    }
}
