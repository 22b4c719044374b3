//! MailGuard Telemetry
//!
//! Metrics for the masking and classification service.
//!
//! Provides:
//! - In-process counters served as a JSON snapshot
//! - Prometheus counters and histograms through the `metrics` facade

pub mod metrics;

pub use crate::metrics::{describe_metrics, MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
