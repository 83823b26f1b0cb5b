//! Request metrics.
//!
//! Sessions report through a [`MetricsSink`]. The process-wide default,
//! returned by [`default_metrics`], is chosen once: with the `metrics` feature
//! enabled it forwards to the [`metrics`](https://docs.rs/metrics) facade
//! ([`RecorderMetrics`]), otherwise every update is a no-op ([`NoopMetrics`]).
//!
//! Instruments recorded by [`RecorderMetrics`]:
//!
//! | name                       | kind      | labels           |
//! |----------------------------|-----------|------------------|
//! | `feed_timeouts`            | counter   | `domain`         |
//! | `feed_connection_failures` | counter   | `domain`         |
//! | `feed_latency_seconds`     | histogram | `domain`, `code` |
//!
//! Histogram buckets are owned by the exporter; [`LATENCY_BUCKETS`] holds the
//! boundaries the latency histogram is meant to use.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use lazy_static::lazy_static;
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

/// Latency histogram bucket boundaries, in seconds.
pub const LATENCY_BUCKETS: [f64; 6] = [0.25, 0.5, 0.75, 1.0, 2.0, 3.0];

/// Name of the timeout counter.
pub const TIMEOUTS: &str = "feed_timeouts";
/// Name of the connection failure counter.
pub const CONNECTION_FAILURES: &str = "feed_connection_failures";
/// Name of the latency histogram.
pub const LATENCY: &str = "feed_latency_seconds";

/// Receiver of request outcome observations.
///
/// Implementations must be cheap and must never panic; they are called on
/// every request.
pub trait MetricsSink: Send + Sync + Debug {
    /// A request to `host` timed out.
    fn record_timeout(&self, host: &str);

    /// A request to `host` failed to connect.
    fn record_connection_failure(&self, host: &str);

    /// A request to `host` completed with `status` after `elapsed`.
    fn record_latency(&self, host: &str, status: StatusCode, elapsed: Duration);
}

/// Sink that drops every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    #[inline]
    fn record_timeout(&self, _host: &str) {}

    #[inline]
    fn record_connection_failure(&self, _host: &str) {}

    #[inline]
    fn record_latency(&self, _host: &str, _status: StatusCode, _elapsed: Duration) {}
}

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track number of timed out requests.
    pub static ref TIMEOUT_COUNTER: &'static str = {
        metrics::describe_counter!(TIMEOUTS, "A counter of timed out requests");
        TIMEOUTS
    };
    /// Track number of requests which failed to connect.
    pub static ref CONNECTION_FAILED_COUNTER: &'static str = {
        metrics::describe_counter!(
            CONNECTION_FAILURES,
            "A counter of requests which failed to connect"
        );
        CONNECTION_FAILURES
    };
    /// Histogram of request latency.
    pub static ref LATENCY_HISTOGRAM: &'static str = {
        metrics::describe_histogram!(
            LATENCY,
            metrics::Unit::Seconds,
            "Latency of completed requests in seconds"
        );
        LATENCY
    };
}

/// Sink forwarding to the globally installed `metrics` recorder.
///
/// Without an installed recorder the facade discards updates, so this sink
/// is safe to use unconditionally.
#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderMetrics;

#[cfg(feature = "metrics")]
impl MetricsSink for RecorderMetrics {
    #[inline]
    fn record_timeout(&self, host: &str) {
        metrics::counter!(*TIMEOUT_COUNTER, "domain" => host.to_owned()).increment(1);
    }

    #[inline]
    fn record_connection_failure(&self, host: &str) {
        metrics::counter!(*CONNECTION_FAILED_COUNTER, "domain" => host.to_owned()).increment(1);
    }

    #[inline]
    fn record_latency(&self, host: &str, status: StatusCode, elapsed: Duration) {
        metrics::histogram!(
            *LATENCY_HISTOGRAM,
            "domain" => host.to_owned(),
            "code" => status.as_u16().to_string()
        )
        .record(elapsed.as_secs_f64());
    }
}

lazy_static! {
    static ref DEFAULT_METRICS: Arc<dyn MetricsSink> = {
        #[cfg(feature = "metrics")]
        let sink: Arc<dyn MetricsSink> = Arc::new(RecorderMetrics);
        #[cfg(not(feature = "metrics"))]
        let sink: Arc<dyn MetricsSink> = Arc::new(NoopMetrics);
        sink
    };
}

/// Process-wide default sink, resolved on first use.
pub fn default_metrics() -> Arc<dyn MetricsSink> {
    Arc::clone(&DEFAULT_METRICS)
}

/// Prometheus exporter builder with [`LATENCY_BUCKETS`] configured for the
/// latency histogram.
///
/// ```no_run
/// let handle = sessionbox::metrics::prometheus_builder()
///     .unwrap()
///     .install_recorder()
///     .unwrap();
/// println!("{}", handle.render());
/// ```
#[cfg(feature = "prometheus")]
#[cfg_attr(docsrs, doc(cfg(feature = "prometheus")))]
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(LATENCY.to_owned()), &LATENCY_BUCKETS)
}
