//! Timeout-enforcing transport on top of `reqwest`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use reqwest::Client;
use tracing::trace;
use url::Url;

use crate::config::Timeout;
use crate::error::{Error, Result};
use crate::request::netloc;
use crate::response::Response;
use crate::transport::Transport;

/// Upper bound on the clients kept by a [`TimeoutAdapter`], default included.
pub const MAX_CLIENTS: usize = 8;

/// Sends requests through `reqwest`, applying a timeout pair to every one.
///
/// The timeout is the per-call [`Timeout`] found in the request extensions,
/// or the one given at construction. The total request deadline is always
/// set to [`Timeout::total`].
///
/// Clients carry the connect and read timeouts, so each distinct pair gets its
/// own client, up to [`MAX_CLIENTS`]. Once the limit is reached, further pairs
/// share the default client and are enforced through the total deadline only.
///
/// Cloning is cheap, clones share the clients.
#[derive(Debug, Clone)]
pub struct TimeoutAdapter {
    timeout: Timeout,
    clients: Arc<DashMap<Timeout, Client>>,
}

impl TimeoutAdapter {
    /// Creates an adapter with a default timeout pair.
    pub fn new(timeout: Timeout) -> Result<Self> {
        let clients = DashMap::new();
        clients.insert(timeout, build_client(timeout)?);
        Ok(Self {
            timeout,
            clients: Arc::new(clients),
        })
    }

    /// Default timeout pair.
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    fn client(&self, timeout: Timeout) -> Result<Client> {
        if let Some(client) = self.clients.get(&timeout) {
            return Ok(client.clone());
        }
        if self.clients.len() >= MAX_CLIENTS {
            trace!(?timeout, "Client limit reached, using default client");
            return self.client(self.timeout);
        }
        trace!(?timeout, "Build client for per-call timeout");
        let client = build_client(timeout)?;
        Ok(self.clients.entry(timeout).or_insert(client).clone())
    }
}

fn build_client(timeout: Timeout) -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(timeout.connect)
        .read_timeout(timeout.read)
        .build()?)
}

#[async_trait]
impl Transport for TimeoutAdapter {
    async fn send(&self, request: http::Request<Bytes>) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let timeout = parts
            .extensions
            .get::<Timeout>()
            .copied()
            .unwrap_or(self.timeout);
        let host = netloc(&parts.uri);
        let url = Url::parse(&parts.uri.to_string()).map_err(Error::invalid)?;

        let mut request = reqwest::Request::new(parts.method, url);
        *request.headers_mut() = parts.headers;
        *request.timeout_mut() = Some(timeout.total());
        if !body.is_empty() {
            *request.body_mut() = Some(body.into());
        }

        let client = self.client(timeout)?;
        let started = Instant::now();
        let response = client
            .execute(request)
            .await
            .map_err(|error| Error::from_transport(&host, error))?;

        let url = response.url().clone();
        let mut head = http::Response::new(()).into_parts().0;
        head.status = response.status();
        head.version = response.version();
        head.headers = response.headers().clone();

        let body = response
            .bytes()
            .await
            .map_err(|error| Error::from_transport(&host, error))?;

        Ok(Response::from_parts(head, body, url, started.elapsed()))
    }
}
