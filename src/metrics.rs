//! Request metrics for production monitoring
//!
//! Tracks request counts, error rates, and inference latency with relaxed
//! atomics so the request path stays lock-free. Exposed in Prometheus text
//! format at `/metrics` and as a JSON snapshot for tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Central metrics collector shared by all handlers
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of requests processed
    total_requests: Arc<AtomicUsize>,
    /// Requests that produced a successful response
    successful_requests: Arc<AtomicUsize>,
    /// Requests that produced an error response
    failed_requests: Arc<AtomicUsize>,
    /// Individual predictions served (batch items count separately)
    total_predictions: Arc<AtomicUsize>,
    /// Total inference time in microseconds
    total_inference_time_us: Arc<AtomicU64>,
    /// Start time for uptime and rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new collector with all counters at zero
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_predictions: Arc::new(AtomicUsize::new(0)),
            total_inference_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful request that served `predictions` results
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, predictions: usize, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_predictions
            .fetch_add(predictions, Ordering::Relaxed);
        self.total_inference_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a request that ended in an error response
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_predictions = self.total_predictions.load(Ordering::Relaxed);
        let total_time_us = self.total_inference_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            total_predictions,
            uptime_secs: uptime.as_secs(),
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Export all metrics in Prometheus text format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP catar_requests_total Total number of requests\n\
             # TYPE catar_requests_total counter\n\
             catar_requests_total {}\n\
             # HELP catar_requests_successful Successful requests\n\
             # TYPE catar_requests_successful counter\n\
             catar_requests_successful {}\n\
             # HELP catar_requests_failed Failed requests\n\
             # TYPE catar_requests_failed counter\n\
             catar_requests_failed {}\n\
             # HELP catar_predictions_total Individual predictions served\n\
             # TYPE catar_predictions_total counter\n\
             catar_predictions_total {}\n\
             # HELP catar_uptime_seconds Seconds since the collector started\n\
             # TYPE catar_uptime_seconds gauge\n\
             catar_uptime_seconds {}\n\
             # HELP catar_avg_latency_ms Average successful request latency\n\
             # TYPE catar_avg_latency_ms gauge\n\
             catar_avg_latency_ms {:.3}\n\
             # HELP catar_error_rate Fraction of requests that failed\n\
             # TYPE catar_error_rate gauge\n\
             catar_error_rate {:.4}\n",
            snapshot.total_requests,
            snapshot.successful_requests,
            snapshot.failed_requests,
            snapshot.total_predictions,
            snapshot.uptime_secs,
            snapshot.avg_latency_ms,
            snapshot.error_rate,
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the collector, serializable for tests and tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total number of requests processed
    pub total_requests: usize,
    /// Requests that produced a successful response
    pub successful_requests: usize,
    /// Requests that produced an error response
    pub failed_requests: usize,
    /// Individual predictions served
    pub total_predictions: usize,
    /// Seconds since the collector started
    pub uptime_secs: u64,
    /// Average successful request latency in milliseconds
    pub avg_latency_ms: f64,
    /// Fraction of requests that failed
    pub error_rate: f64,
}
