#![cfg_attr(docsrs, feature(doc_cfg))]
//! HTTP sessions with enforced timeouts, response caching and request metrics.
//!
//! `sessionbox` wraps [`reqwest`] in a [`Session`] that:
//!
//! - applies a `(connect, read)` [`Timeout`] to every request, overridable per
//!   call, so no request can block indefinitely;
//! - merges default headers into every request;
//! - counts timeouts and connection failures per host and records request
//!   latency per host and status code through a [`MetricsSink`];
//! - optionally caches `GET` responses in a [`Backend`] following HTTP caching
//!   rules ([`CachedSession`]).
//!
//! # Uncached session
//!
//! ```no_run
//! use std::time::Duration;
//! use sessionbox::{SessionConfig, Timeout, UncachedSession};
//!
//! # async fn run() -> Result<(), sessionbox::Error> {
//! let config = SessionConfig::default()
//!     .timeout(Timeout::new(Duration::from_millis(500), Duration::from_secs(3)));
//! let session = UncachedSession::new(config)?;
//!
//! let response = session.get("https://example.com/feed.xml").await?;
//! println!("{} in {:?}", response.status(), response.elapsed());
//! # Ok(())
//! # }
//! ```
//!
//! # Cached session
//!
//! ```no_run
//! # #[cfg(feature = "redis")]
//! # async fn run() -> Result<(), sessionbox::Error> {
//! use sessionbox::{CachedSession, RedisConfig, SessionConfig};
//!
//! let session = CachedSession::new(SessionConfig::default(), RedisConfig::default())?;
//!
//! let first = session.get("https://example.com/feed.xml").await?;
//! let second = session.get("https://example.com/feed.xml").await?;
//! println!("{:?} then {:?}", first.cache_status(), second.cache_status());
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `redis` (default): [`RedisBackend`] and [`CachedSession::new`].
//! - `metrics`: report through the [`metrics`](https://docs.rs/metrics) facade
//!   by default instead of discarding observations.
//! - `prometheus`: [`metrics::prometheus_builder`] with the latency buckets
//!   preconfigured.

pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use adapter::TimeoutAdapter;
pub use cache::{CACHE_STATUS_HEADER, CacheLayer};
pub use config::{CacheSettings, SessionConfig, Timeout};
pub use error::{Error, Result};
pub use metrics::{MetricsSink, NoopMetrics, default_metrics};
pub use request::RequestOptions;
pub use response::{CacheStatus, Response};
pub use session::{CachedSession, Session, UncachedSession};
pub use transport::Transport;

pub use sessionbox_backend::{Backend, BackendError, CacheKey, CacheValue, DeleteStatus};

#[cfg(feature = "redis")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
pub use sessionbox_redis::{RedisBackend, RedisConfig};

/// The `sessionbox` prelude.
pub mod prelude {
    pub use crate::{
        CacheSettings, CacheStatus, CachedSession, Error, RequestOptions, Response, Session,
        SessionConfig, Timeout, UncachedSession,
    };

    #[cfg(feature = "redis")]
    pub use crate::RedisConfig;
}
