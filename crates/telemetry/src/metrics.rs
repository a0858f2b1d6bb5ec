//! Internal metrics collection.
//!
//! Lock-free counters and a latency histogram, kept in memory for the
//! lifetime of the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the gateway.
#[derive(Debug, Default)]
pub struct Metrics {
    // Proxy traffic
    pub chat_requests: Counter,
    pub tts_requests: Counter,
    pub health_checks: Counter,

    // Lead pipeline
    pub leads_received: Counter,
    pub leads_accepted: Counter,
    pub leads_rejected: Counter,
    pub rate_limited_requests: Counter,
    pub recaptcha_rejections: Counter,
    pub notifications_sent: Counter,
    pub notification_failures: Counter,

    // Upstream calls
    pub upstream_errors: Counter,
    pub upstream_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub chat_requests: u64,
    pub tts_requests: u64,
    pub health_checks: u64,
    pub leads_received: u64,
    pub leads_accepted: u64,
    pub leads_rejected: u64,
    pub rate_limited_requests: u64,
    pub recaptcha_rejections: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
    pub upstream_errors: u64,
    pub upstream_calls: u64,
    pub upstream_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            chat_requests: self.chat_requests.get(),
            tts_requests: self.tts_requests.get(),
            health_checks: self.health_checks.get(),
            leads_received: self.leads_received.get(),
            leads_accepted: self.leads_accepted.get(),
            leads_rejected: self.leads_rejected.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            recaptcha_rejections: self.recaptcha_rejections.get(),
            notifications_sent: self.notifications_sent.get(),
            notification_failures: self.notification_failures.get(),
            upstream_errors: self.upstream_errors.get(),
            upstream_calls: self.upstream_latency_ms.count(),
            upstream_latency_mean_ms: self.upstream_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
