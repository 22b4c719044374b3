//! Metrics collection and reporting
//!
//! Every recording updates both the in-process counters behind
//! [`MetricsCollector::snapshot`] and the global `metrics` recorder, which the
//! server renders in Prometheus text format.

use mailguard_core::{Entity, EntityKind};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Requests handled, by endpoint
pub const REQUESTS_TOTAL: &str = "mailguard_requests_total";

/// Entities masked, by kind
pub const ENTITIES_MASKED_TOTAL: &str = "mailguard_entities_masked_total";

/// Emails classified, by category
pub const CLASSIFICATIONS_TOTAL: &str = "mailguard_classifications_total";

/// Failed requests, by error type
pub const ERRORS_TOTAL: &str = "mailguard_errors_total";

/// Masking and classification latency in microseconds
pub const PIPELINE_LATENCY_US: &str = "mailguard_pipeline_latency_us";

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of requests by endpoint");
    metrics::describe_counter!(ENTITIES_MASKED_TOTAL, "Total number of masked entities by kind");
    metrics::describe_counter!(CLASSIFICATIONS_TOTAL, "Total number of classified emails by category");
    metrics::describe_counter!(ERRORS_TOTAL, "Total number of errors by type");
    metrics::describe_histogram!(
        PIPELINE_LATENCY_US,
        metrics::Unit::Microseconds,
        "Pipeline latency in microseconds"
    );
}

/// Metrics collector for MailGuard request handling
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_latency_us: AtomicU64,
    entities: [AtomicU64; EntityKind::ALL.len()],
    categories: Mutex<HashMap<String, u64>>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                total_errors: AtomicU64::new(0),
                total_latency_us: AtomicU64::new(0),
                entities: std::array::from_fn(|_| AtomicU64::new(0)),
                categories: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Record a request to `endpoint`
    pub fn record_request(&self, endpoint: &'static str) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
    }

    /// Record masked entities, counted per kind
    pub fn record_entities(&self, entities: &[Entity]) {
        for entity in entities {
            self.inner.entities[entity.classification as usize].fetch_add(1, Ordering::Relaxed);
            metrics::counter!(ENTITIES_MASKED_TOTAL, "kind" => entity.classification.as_str())
                .increment(1);
        }
    }

    /// Record a predicted category
    pub fn record_category(&self, category: &str) {
        *self
            .inner
            .categories
            .lock()
            .entry(category.to_string())
            .or_insert(0) += 1;
        metrics::counter!(CLASSIFICATIONS_TOTAL, "category" => category.to_string()).increment(1);
    }

    /// Record pipeline latency for `endpoint`
    pub fn record_latency(&self, endpoint: &'static str, latency_us: u64) {
        self.inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        metrics::histogram!(PIPELINE_LATENCY_US, "endpoint" => endpoint).record(latency_us as f64);
    }

    /// Record a failed request
    pub fn record_error(&self, error_type: &'static str) {
        self.inner.total_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let entities_masked = EntityKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.as_str().to_string(),
                    self.inner.entities[*kind as usize].load(Ordering::Relaxed),
                )
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        let categories = self
            .inner
            .categories
            .lock()
            .iter()
            .map(|(category, count)| (category.clone(), *count))
            .collect();

        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            total_errors: self.inner.total_errors.load(Ordering::Relaxed),
            total_latency_us: self.inner.total_latency_us.load(Ordering::Relaxed),
            entities_masked,
            categories,
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_latency_us: u64,
    pub entities_masked: BTreeMap<String, u64>,
    pub categories: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    /// Calculate average latency per request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Calculate error rate
    pub fn error_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_errors as f64 / self.total_requests as f64
        }
    }

    /// Entities masked across all kinds
    pub fn total_entities(&self) -> u64 {
        self.entities_masked.values().sum()
    }
}
