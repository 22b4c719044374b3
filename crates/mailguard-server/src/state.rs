//! Shared application state

use crate::config::ServerConfig;
use anyhow::Context;
use mailguard_classifiers::{EmailPipeline, PiiMasker};
use mailguard_telemetry::MetricsCollector;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Masker for `/mask`, available with or without a model
    pub masker: Arc<PiiMasker>,

    /// Mask → normalize → classify pipeline, if artifacts were loaded
    pub pipeline: Option<EmailPipeline>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,

    /// In-process counters for `/stats`
    pub metrics: MetricsCollector,
}

impl AppState {
    /// Build state, loading model artifacts before the server binds
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> anyhow::Result<Self> {
        let masker = Arc::new(PiiMasker::new()?);
        info!("Masker ready with {} stages", masker.stage_count());

        let artifacts = &config.classifier.artifacts;
        let pipeline = match EmailPipeline::load(artifacts) {
            Ok(pipeline) => Some(pipeline),
            Err(e) if !config.require_model => {
                warn!("Starting without a model, /classify is unavailable: {}", e);
                None
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "failed to load model artifacts ({}, {})",
                        artifacts.model_path.display(),
                        artifacts.labels_path.display()
                    )
                })
            }
        };

        Ok(Self::from_parts(config, masker, pipeline, metrics_handle))
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: ServerConfig,
        masker: Arc<PiiMasker>,
        pipeline: Option<EmailPipeline>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            masker,
            pipeline,
            metrics_handle,
            metrics: MetricsCollector::new(),
        }
    }
}
