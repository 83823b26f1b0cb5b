//! Response caching decorator.
//!
//! [`CacheLayer`] wraps another [`Transport`] and keeps responses in a
//! [`Backend`]. Freshness and revalidation follow HTTP caching rules as
//! implemented by [`http_cache_semantics`]:
//!
//! - a fresh entry is returned without a network call ([`CacheStatus::Hit`]);
//! - a stale entry with a validator is revalidated with a conditional request,
//!   `304 Not Modified` refreshes it ([`CacheStatus::Revalidated`]);
//! - anything else goes to the network and the response is stored if the
//!   cache-control directives allow it ([`CacheStatus::Miss`]).
//!
//! Only `GET` requests are looked up. Unsafe methods invalidate the stored
//! `GET` entry for their URL.
//!
//! The store is an optimization: read, write and remove failures, slow
//! operations and undecodable entries are logged and skipped. When the read
//! fails, the response is not written back.

mod entry;

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderValue, Method, Uri, header::HeaderName, request};
use http_cache_semantics::{AfterResponse, BeforeRequest, CacheOptions, CachePolicy};
use sessionbox_backend::{Backend, CacheKey, CacheValue, DeleteStatus};
use tracing::{debug, trace, warn};

use crate::config::CacheSettings;
use crate::error::Result;
use crate::response::{CacheStatus, Response};
use crate::transport::Transport;

use self::entry::CachedResponse;

/// Header carrying the [`CacheStatus`] of responses passing through the layer.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache-status");

/// Transport decorator serving responses from a cache backend.
#[derive(Debug)]
pub struct CacheLayer<T, B> {
    inner: T,
    backend: Arc<B>,
    settings: CacheSettings,
}

impl<T, B> CacheLayer<T, B> {
    /// Wraps `inner` with a cache kept in `backend`.
    pub fn new(inner: T, backend: Arc<B>, settings: CacheSettings) -> Self {
        Self {
            inner,
            backend,
            settings,
        }
    }

    /// Wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Cache backend.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Layer settings.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Key of the entry for `method` and `uri`.
    pub fn cache_key(&self, method: &Method, uri: &Uri) -> CacheKey {
        CacheKey::new(
            &self.settings.key_prefix,
            self.settings.key_version,
            &format!("{method} {uri}"),
        )
    }

    fn options(&self) -> CacheOptions {
        CacheOptions {
            shared: self.settings.shared,
            ..CacheOptions::default()
        }
    }
}

impl<T, B> Clone for CacheLayer<T, B>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            backend: Arc::clone(&self.backend),
            settings: self.settings.clone(),
        }
    }
}

impl<T, B> CacheLayer<T, B>
where
    T: Transport,
    B: Backend,
{
    /// Reads and decodes the entry for `key`.
    ///
    /// `Err` means the store could not be reached in time. An undecodable
    /// entry is treated as absent so that it gets overwritten.
    async fn lookup(
        &self,
        key: &CacheKey,
    ) -> std::result::Result<Option<CachedResponse>, Unavailable> {
        let read = tokio::time::timeout(self.settings.backend_timeout, self.backend.read(key));
        let value = match read.await {
            Ok(Ok(Some(value))) => value,
            Ok(Ok(None)) => {
                trace!(%key, "Cache entry not found");
                return Ok(None);
            }
            Ok(Err(error)) => {
                warn!(
                    backend = self.backend.label(),
                    %key,
                    %error,
                    "Cache read failed, bypassing cache"
                );
                return Err(Unavailable);
            }
            Err(_) => {
                warn!(
                    backend = self.backend.label(),
                    %key,
                    "Cache read timed out, bypassing cache"
                );
                return Err(Unavailable);
            }
        };
        match CachedResponse::decode(value.data()) {
            Ok(cached) => Ok(Some(cached)),
            Err(error) => {
                warn!(%key, %error, "Cache entry could not be decoded, ignoring it");
                Ok(None)
            }
        }
    }

    async fn write(&self, key: &CacheKey, entry: &CachedResponse) {
        let now = SystemTime::now();
        let fresh_for = entry.policy.time_to_live(now);
        let keep_for = if has_validator(&entry.headers) {
            fresh_for.max(self.settings.validator_ttl)
        } else {
            fresh_for
        };
        if keep_for.is_zero() {
            trace!(
                %key,
                "Response is stale on arrival and has no validator, not caching"
            );
            return;
        }

        let data = match entry.encode() {
            Ok(data) => data,
            Err(error) => {
                warn!(%key, %error, "Cache entry could not be encoded");
                return;
            }
        };
        let write = tokio::time::timeout(
            self.settings.backend_timeout,
            self.backend.write(key, CacheValue::with_ttl(data, keep_for)),
        );
        match write.await {
            Ok(Ok(())) => trace!(%key, ?keep_for, "Response cached"),
            Ok(Err(error)) => {
                warn!(
                    backend = self.backend.label(),
                    %key,
                    %error,
                    "Cache write failed"
                );
            }
            Err(_) => warn!(
                backend = self.backend.label(),
                %key,
                "Cache write timed out"
            ),
        }
    }

    async fn store(&self, key: &CacheKey, request: &request::Parts, response: &Response) {
        let request = http::Request::from_parts(request.clone(), ());
        let head = http::Response::from_parts(response.head().clone(), ());
        let policy =
            CachePolicy::new_options(&request, &head, SystemTime::now(), self.options());
        if !policy.is_storable() {
            trace!(%key, "Response is not storable");
            return;
        }
        self.write(key, &CachedResponse::new(policy, response)).await;
    }

    async fn invalidate(&self, uri: &Uri) {
        let key = self.cache_key(&Method::GET, uri);
        let remove =
            tokio::time::timeout(self.settings.backend_timeout, self.backend.remove(&key));
        match remove.await {
            Ok(Ok(DeleteStatus::Deleted(_))) => debug!(%key, "Cache entry invalidated"),
            Ok(Ok(DeleteStatus::Missing)) => {}
            Ok(Err(error)) => {
                warn!(
                    backend = self.backend.label(),
                    %key,
                    %error,
                    "Cache invalidation failed"
                );
            }
            Err(_) => warn!(
                backend = self.backend.label(),
                %key,
                "Cache invalidation timed out"
            ),
        }
    }

    /// Handles the answer to a conditional request for `cached`.
    async fn revalidated(
        &self,
        key: &CacheKey,
        cached: CachedResponse,
        request: request::Parts,
        response: Response,
    ) -> (Response, CacheStatus) {
        let now = SystemTime::now();
        let conditional = http::Request::from_parts(request.clone(), ());
        let head = http::Response::from_parts(response.head().clone(), ());
        match cached.policy.after_response(&conditional, &head, now) {
            AfterResponse::NotModified(policy, head) => {
                debug!(%key, "Cache entry revalidated");
                let refreshed = CachedResponse {
                    policy,
                    status: head.status,
                    headers: head.headers.clone(),
                    url: cached.url,
                    body: cached.body,
                };
                self.write(key, &refreshed).await;
                (
                    refreshed.to_response(head, response.elapsed()),
                    CacheStatus::Revalidated,
                )
            }
            AfterResponse::Modified(..) => {
                debug!(%key, status = %response.status(), "Cache entry replaced");
                self.store(key, &request, &response).await;
                (response, CacheStatus::Miss)
            }
        }
    }
}

#[async_trait]
impl<T, B> Transport for CacheLayer<T, B>
where
    T: Transport,
    B: Backend,
{
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response> {
        let (parts, body) = request.into_parts();

        if parts.method != Method::GET {
            let invalidates = !parts.method.is_safe();
            let uri = parts.uri.clone();
            let response = self
                .inner
                .send(http::Request::from_parts(parts, body))
                .await?;
            if invalidates && !is_error(&response) {
                self.invalidate(&uri).await;
            }
            return Ok(mark(response, CacheStatus::Miss));
        }

        let key = self.cache_key(&parts.method, &parts.uri);
        let started = Instant::now();

        let cached = match self.lookup(&key).await {
            Ok(cached) => cached,
            Err(Unavailable) => {
                // The store just failed, writing back would only fail again.
                let response = self
                    .inner
                    .send(http::Request::from_parts(parts, body))
                    .await?;
                return Ok(mark(response, CacheStatus::Miss));
            }
        };

        if let Some(cached) = cached {
            let lookup = http::Request::from_parts(parts.clone(), ());
            match cached.policy.before_request(&lookup, SystemTime::now()) {
                BeforeRequest::Fresh(head) => {
                    debug!(%key, "Cache hit");
                    let response = cached.to_response(head, started.elapsed());
                    return Ok(mark(response, CacheStatus::Hit));
                }
                BeforeRequest::Stale {
                    request: mut conditional,
                    matches: true,
                } => {
                    debug!(%key, "Cache entry stale, revalidating");
                    conditional.extensions = parts.extensions.clone();
                    let response = self
                        .inner
                        .send(http::Request::from_parts(conditional.clone(), body))
                        .await?;
                    let (response, status) =
                        self.revalidated(&key, cached, conditional, response).await;
                    return Ok(mark(response, status));
                }
                BeforeRequest::Stale { matches: false, .. } => {
                    trace!(%key, "Cache entry does not match request");
                }
            }
        }

        debug!(%key, "Cache miss");
        let response = self
            .inner
            .send(http::Request::from_parts(parts.clone(), body))
            .await?;
        self.store(&key, &parts, &response).await;
        Ok(mark(response, CacheStatus::Miss))
    }
}

/// The store failed or timed out on read.
struct Unavailable;

fn mark(response: Response, status: CacheStatus) -> Response {
    let mut response = response.with_cache_status(status);
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_str()));
    response
}

fn is_error(response: &Response) -> bool {
    response.status().is_client_error() || response.status().is_server_error()
}

fn has_validator(headers: &http::HeaderMap) -> bool {
    headers.contains_key(http::header::ETAG) || headers.contains_key(http::header::LAST_MODIFIED)
}
