//! The seam between sessions and whatever actually sends requests.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::response::Response;

/// Sends a fully prepared request and returns the buffered response.
///
/// A per-call [`Timeout`](crate::Timeout) travels in the request extensions.
/// Implementations report timeouts as [`Error::Timeout`](crate::Error::Timeout)
/// and failed connections as [`Error::Connection`](crate::Error::Connection)
/// so that sessions can count them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`.
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response> {
        (**self).send(request).await
    }
}
