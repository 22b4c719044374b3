//! Configuration for model artifacts and training

use crate::model::{DEFAULT_ALPHA, DEFAULT_MAX_FEATURES};
use mailguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the classification model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Where the fitted artifacts live
    #[serde(default)]
    pub artifacts: ArtifactConfig,

    /// Training hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,
}

/// Artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Fitted vectorizer + classifier
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Label codec
    #[serde(default = "default_labels_path")]
    pub labels_path: PathBuf,
}

impl ArtifactConfig {
    /// Artifact paths inside an output directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join(MODEL_FILE_NAME),
            labels_path: dir.join(LABELS_FILE_NAME),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            labels_path: default_labels_path(),
        }
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Vocabulary cap for the vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Naive Bayes additive smoothing
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Fraction of records held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Seed for the train/test shuffle
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl TrainingConfig {
    /// Reject out-of-range hyperparameters
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::config("max_features must be at least 1"));
        }
        if !(self.alpha >= 0.0) {
            return Err(Error::config(format!("alpha must be non-negative, got {}", self.alpha)));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(Error::config(format!(
                "test_size must be between 0 and 1 (exclusive), got {}",
                self.test_size
            )));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            alpha: default_alpha(),
            test_size: default_test_size(),
            seed: default_seed(),
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse classifier config: {}", e)))?;
        config.training.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read classifier config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }
}

/// File name of the model artifact
pub const MODEL_FILE_NAME: &str = "email_classifier.json";

/// File name of the label codec artifact
pub const LABELS_FILE_NAME: &str = "label_encoder.json";

fn default_model_path() -> PathBuf {
    PathBuf::from("./output").join(MODEL_FILE_NAME)
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("./output").join(LABELS_FILE_NAME)
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}
