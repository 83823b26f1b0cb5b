//! Stored form of a cached response.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, response::Parts};
use http_cache_semantics::CachePolicy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::response::Response;

/// A response together with the policy that decides when it may be reused.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CachedResponse {
    pub(crate) policy: CachePolicy,
    #[serde(with = "http_serde::status_code")]
    pub(crate) status: StatusCode,
    #[serde(with = "http_serde::header_map")]
    pub(crate) headers: HeaderMap,
    pub(crate) url: Url,
    pub(crate) body: Bytes,
}

impl CachedResponse {
    pub(crate) fn new(policy: CachePolicy, response: &Response) -> Self {
        Self {
            policy,
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
            body: response.body().clone(),
        }
    }

    pub(crate) fn encode(&self) -> serde_json::Result<Bytes> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    pub(crate) fn decode(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }

    /// Builds a response from this entry with `head` as produced by the policy.
    pub(crate) fn to_response(&self, head: Parts, elapsed: Duration) -> Response {
        Response::from_parts(head, self.body.clone(), self.url.clone(), elapsed)
    }
}
