//! Sessions: the request entry point.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use tracing::debug;
use url::Url;

#[cfg(feature = "redis")]
use sessionbox_redis::{RedisBackend, RedisConfig};

use crate::adapter::TimeoutAdapter;
use crate::cache::CacheLayer;
use crate::config::{CacheSettings, SessionConfig};
use crate::error::{Error, Result};
use crate::metrics::{MetricsSink, default_metrics};
use crate::request::{RequestOptions, merge_headers, netloc};
use crate::response::{CacheStatus, Response};
use crate::transport::Transport;

/// HTTP session sending requests through a [`Transport`].
///
/// Every request gets the session's default headers and a timeout, and its
/// outcome is reported to a [`MetricsSink`]:
///
/// - a timeout increments the timeout counter of the destination host;
/// - a failed connection increments its connection failure counter;
/// - a completed request records its latency under host and status code,
///   unless it was answered entirely from cache.
///
/// Errors are returned to the caller unchanged.
#[derive(Clone)]
pub struct Session<T> {
    transport: T,
    headers: HeaderMap,
    metrics: Arc<dyn MetricsSink>,
}

/// Session without response caching.
pub type UncachedSession = Session<TimeoutAdapter>;

/// Session with responses cached in `B`.
#[cfg(feature = "redis")]
pub type CachedSession<B = RedisBackend> = Session<CacheLayer<TimeoutAdapter, B>>;

/// Session with responses cached in `B`.
#[cfg(not(feature = "redis"))]
pub type CachedSession<B> = Session<CacheLayer<TimeoutAdapter, B>>;

impl<T> fmt::Debug for Session<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("transport", &self.transport)
            .field("headers", &self.headers)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl<T> Session<T> {
    /// Creates a session over an arbitrary transport.
    pub fn with_transport(transport: T, headers: HeaderMap) -> Self {
        Self {
            transport,
            headers,
            metrics: default_metrics(),
        }
    }

    /// Replaces the metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Default headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl UncachedSession {
    /// Creates a session sending requests directly to the network.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let adapter = TimeoutAdapter::new(config.timeout)?;
        Ok(Self::with_transport(adapter, config.headers))
    }
}

impl<B> Session<CacheLayer<TimeoutAdapter, B>> {
    /// Creates a caching session on top of `backend`.
    pub fn with_backend(
        config: SessionConfig,
        backend: Arc<B>,
        settings: CacheSettings,
    ) -> Result<Self> {
        let adapter = TimeoutAdapter::new(config.timeout)?;
        let layer = CacheLayer::new(adapter, backend, settings);
        Ok(Self::with_transport(layer, config.headers))
    }
}

#[cfg(feature = "redis")]
impl Session<CacheLayer<TimeoutAdapter, RedisBackend>> {
    /// Creates a session caching responses in Redis with default
    /// [`CacheSettings`].
    ///
    /// No connection is made here; the store is contacted on the first
    /// cacheable request.
    pub fn new(config: SessionConfig, redis: RedisConfig) -> Result<Self> {
        let backend = RedisBackend::from_config(&redis)
            .map_err(|error| Error::invalid(format_args!("redis backend: {error}")))?;
        Self::with_backend(config, Arc::new(backend), CacheSettings::default())
    }
}

impl<T> Session<T>
where
    T: Transport,
{
    /// Sends a request.
    ///
    /// The URL must be absolute with an `http` or `https` scheme. Malformed
    /// input fails with [`Error::InvalidRequest`] before any network activity.
    pub async fn request<M>(
        &self,
        method: M,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response>
    where
        M: TryInto<Method>,
        M::Error: fmt::Display,
    {
        let method = method.try_into().map_err(Error::invalid)?;
        let request = self.prepare(method, url, options)?;
        let host = netloc(request.uri());
        debug!(method = %request.method(), uri = %request.uri(), "Send request");

        match self.transport.send(request).await {
            Ok(response) => {
                if response.cache_status() != CacheStatus::Hit {
                    self.metrics
                        .record_latency(&host, response.status(), response.elapsed());
                }
                debug!(
                    %host,
                    status = %response.status(),
                    elapsed = ?response.elapsed(),
                    cache = response.cache_status().as_str(),
                    "Request completed"
                );
                Ok(response)
            }
            Err(error) => {
                match &error {
                    Error::Timeout { .. } => {
                        debug!(%host, %error, "Request timed out");
                        self.metrics.record_timeout(&host);
                    }
                    Error::Connection { .. } => {
                        debug!(%host, %error, "Connection failed");
                        self.metrics.record_connection_failure(&host);
                    }
                    _ => debug!(%host, %error, "Request failed"),
                }
                Err(error)
            }
        }
    }

    fn prepare(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<http::Request<Bytes>> {
        let mut url = Url::parse(url).map_err(Error::invalid)?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::invalid(format_args!(
                    "unsupported scheme `{scheme}`"
                )));
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::invalid(format_args!("missing host in `{url}`")));
        }
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }
        let uri: Uri = url.as_str().parse().map_err(Error::invalid)?;

        let mut request = http::Request::new(options.body.unwrap_or_default());
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        *request.headers_mut() = merge_headers(&self.headers, &options.headers);
        if let Some(timeout) = options.timeout {
            request.extensions_mut().insert(timeout);
        }
        Ok(request)
    }

    /// Sends a `GET` request.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestOptions::default())
            .await
    }

    /// Sends a `HEAD` request.
    pub async fn head(&self, url: &str) -> Result<Response> {
        self.request(Method::HEAD, url, RequestOptions::default())
            .await
    }

    /// Sends a `POST` request with `body`.
    pub async fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<Response> {
        self.request(Method::POST, url, RequestOptions::new().body(body))
            .await
    }

    /// Sends a `PUT` request with `body`.
    pub async fn put(&self, url: &str, body: impl Into<Bytes>) -> Result<Response> {
        self.request(Method::PUT, url, RequestOptions::new().body(body))
            .await
    }

    /// Sends a `PATCH` request with `body`.
    pub async fn patch(&self, url: &str, body: impl Into<Bytes>) -> Result<Response> {
        self.request(Method::PATCH, url, RequestOptions::new().body(body))
            .await
    }

    /// Sends a `DELETE` request.
    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.request(Method::DELETE, url, RequestOptions::default())
            .await
    }
}
