//! Server configuration

use mailguard_classifiers::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Refuse to start without model artifacts
    ///
    /// When false the service starts without a model, `/mask` and `/demask`
    /// keep working and `/classify` answers 503.
    #[serde(default = "default_true")]
    pub require_model: bool,

    /// Artifact locations and training defaults
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Values from the command line that replace configured ones
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.classifier.training.validate()?;
        Ok(config)
    }

    /// Load from file, or use defaults when the file does not exist
    pub fn load(config_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = config_path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply CLI overrides
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(listen) = overrides.listen {
            self.listen = listen;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(model_path) = overrides.model_path {
            self.classifier.artifacts.model_path = model_path;
        }
        if let Some(labels_path) = overrides.labels_path {
            self.classifier.artifacts.labels_path = labels_path;
        }
        self
    }

    /// `listen:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            require_model: true,
            classifier: ClassifierConfig::default(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}
