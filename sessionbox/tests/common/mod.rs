//! Shared test doubles: in-memory backends, a scripted transport and a
//! recording metrics sink.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use http::StatusCode;
use sessionbox::{Error, MetricsSink, Response, Transport};
use sessionbox_backend::{
    Backend, BackendError, BackendResult, CacheKey, CacheValue, DeleteStatus, Raw,
};
use url::Url;

/// Simple in-memory backend for testing using DashMap.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: DashMap<CacheKey, CacheValue<Raw>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.store
            .iter()
            .map(|entry| entry.key().as_str().to_owned())
            .collect()
    }

    pub fn get_raw(&self, key: &str) -> Option<CacheValue<Raw>> {
        self.store
            .iter()
            .find(|entry| entry.key().as_str() == key)
            .map(|entry| entry.value().clone())
    }

    pub fn insert_raw(&self, key: CacheKey, value: CacheValue<Raw>) {
        self.store.insert(key, value);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        Ok(self.store.get(key).map(|value| value.clone()))
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        self.store.insert(key.clone(), value);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn label(&self) -> &str {
        "memory"
    }
}

/// Backend whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingBackend {
    pub calls: AtomicUsize,
}

impl FailingBackend {
    fn fail<T>(&self) -> BackendResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::ConnectionError(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "store is down",
        ))))
    }
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, _key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        self.fail()
    }

    async fn write(&self, _key: &CacheKey, _value: CacheValue<Raw>) -> BackendResult<()> {
        self.fail()
    }

    async fn remove(&self, _key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.fail()
    }

    fn label(&self) -> &str {
        "failing"
    }
}

/// Backend that answers far too late.
#[derive(Debug)]
pub struct SlowBackend {
    pub delay: Duration,
    pub inner: MemoryBackend,
}

impl SlowBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: MemoryBackend::new(),
        }
    }
}

#[async_trait]
impl Backend for SlowBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<CacheValue<Raw>>> {
        tokio::time::sleep(self.delay).await;
        self.inner.read(key).await
    }

    async fn write(&self, key: &CacheKey, value: CacheValue<Raw>) -> BackendResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        tokio::time::sleep(self.delay).await;
        self.inner.remove(key).await
    }

    fn label(&self) -> &str {
        "slow"
    }
}

/// What [`StubTransport`] answers with.
#[derive(Debug, Clone)]
pub enum Outcome {
    Respond { status: u16, elapsed: Duration },
    Timeout,
    ConnectionFailure,
    Rejected,
}

/// Transport returning a fixed outcome and remembering what it was sent.
#[derive(Debug)]
pub struct StubTransport {
    outcome: Outcome,
    requests: Mutex<Vec<http::Request<Bytes>>>,
}

impl StubTransport {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(status: u16, elapsed: Duration) -> Self {
        Self::new(Outcome::Respond { status, elapsed })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Headers of the `index`-th request sent.
    pub fn headers(&self, index: usize) -> http::HeaderMap {
        self.requests.lock().unwrap()[index].headers().clone()
    }

    /// URI of the `index`-th request sent.
    pub fn uri(&self, index: usize) -> http::Uri {
        self.requests.lock().unwrap()[index].uri().clone()
    }

    /// Body of the `index`-th request sent.
    pub fn body(&self, index: usize) -> Bytes {
        self.requests.lock().unwrap()[index].body().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: http::Request<Bytes>) -> sessionbox::Result<Response> {
        let host = sessionbox::request::netloc(request.uri());
        let url = Url::parse(&request.uri().to_string()).unwrap();
        self.requests.lock().unwrap().push(request);

        match &self.outcome {
            Outcome::Respond { status, elapsed } => {
                let response = http::Response::builder()
                    .status(StatusCode::from_u16(*status).unwrap())
                    .body(Bytes::from_static(b"ok"))
                    .unwrap();
                Ok(Response::new(response, url, *elapsed))
            }
            Outcome::Timeout => Err(Error::Timeout {
                host,
                source: "deadline elapsed".into(),
            }),
            Outcome::ConnectionFailure => Err(Error::Connection {
                host,
                source: "connection refused".into(),
            }),
            Outcome::Rejected => Err(Error::InvalidRequest("rejected by stub".to_owned())),
        }
    }
}

/// Sink keeping every observation in memory.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    pub timeouts: DashMap<String, u64>,
    pub connection_failures: DashMap<String, u64>,
    pub latencies: Mutex<Vec<(String, StatusCode, Duration)>>,
}

impl RecordingMetrics {
    pub fn timeouts(&self, host: &str) -> u64 {
        self.timeouts.get(host).map_or(0, |count| *count)
    }

    pub fn connection_failures(&self, host: &str) -> u64 {
        self.connection_failures.get(host).map_or(0, |count| *count)
    }

    pub fn latencies(&self) -> Vec<(String, StatusCode, Duration)> {
        self.latencies.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.timeouts.is_empty()
            && self.connection_failures.is_empty()
            && self.latencies.lock().unwrap().is_empty()
    }
}

impl MetricsSink for RecordingMetrics {
    fn record_timeout(&self, host: &str) {
        *self.timeouts.entry(host.to_owned()).or_default() += 1;
    }

    fn record_connection_failure(&self, host: &str) {
        *self.connection_failures.entry(host.to_owned()).or_default() += 1;
    }

    fn record_latency(&self, host: &str, status: StatusCode, elapsed: Duration) {
        self.latencies
            .lock()
            .unwrap()
            .push((host.to_owned(), status, elapsed));
    }
}
