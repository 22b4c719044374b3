//! Email category model: TF-IDF vectorizer feeding Multinomial Naive Bayes
//!
//! The fitted model is persisted as one JSON artifact, independent of the
//! label codec artifact so either can be inspected or replaced on its own.

use crate::naive_bayes::MultinomialNb;
use crate::tfidf::TfidfVectorizer;
use mailguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Artifact format version written by this crate
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Default Naive Bayes smoothing
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Vectorize-then-classify model over normalized email text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClassifier {
    format_version: u32,
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
}

impl TextClassifier {
    /// Create an unfitted model
    pub fn new(max_features: Option<usize>, alpha: f64) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            vectorizer: TfidfVectorizer::new(max_features),
            classifier: MultinomialNb::new(alpha),
        }
    }

    /// Fit vectorizer and classifier jointly on normalized documents and class codes
    pub fn fit(&mut self, documents: &[String], labels: &[usize]) -> Result<()> {
        let rows = self.vectorizer.fit_transform(documents)?;
        self.classifier
            .fit(&rows, labels, self.vectorizer.vocabulary_size())?;

        info!(
            "Fitted model on {} documents: {} features, {} classes",
            documents.len(),
            self.vectorizer.vocabulary_size(),
            self.classifier.classes().len()
        );
        Ok(())
    }

    /// Predict the class code of a normalized document
    pub fn predict(&self, document: &str) -> Result<usize> {
        let row = self.vectorizer.transform(document);
        debug!(active_features = row.len(), "Vectorized document");

        self.classifier
            .predict(&row)
            .ok_or_else(|| Error::model_unavailable("model has not been fitted"))
    }

    /// Per-class probabilities as `(class code, probability)`
    pub fn predict_proba(&self, document: &str) -> Vec<(usize, f64)> {
        let row = self.vectorizer.transform(document);
        self.classifier
            .classes()
            .iter()
            .copied()
            .zip(self.classifier.predict_proba(&row))
            .collect()
    }

    /// Class codes the model can predict
    pub fn classes(&self) -> &[usize] {
        self.classifier.classes()
    }

    /// The fitted vectorizer
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Write the model as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Read a model written by [`Self::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::artifact(format!("failed to read model {}: {}", path.display(), e))
        })?;
        let model: Self = serde_json::from_str(&content)
            .map_err(|e| Error::artifact(format!("corrupt model {}: {}", path.display(), e)))?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::artifact(format!(
                "unsupported model format version {}",
                model.format_version
            )));
        }
        model.vectorizer.validate()?;
        model.classifier.validate()?;
        if model.classifier.n_features() != model.vectorizer.vocabulary_size() {
            return Err(Error::artifact(format!(
                "classifier expects {} features but vectorizer has {}",
                model.classifier.n_features(),
                model.vectorizer.vocabulary_size()
            )));
        }

        info!(
            "Loaded model from {} ({} features, {} classes)",
            path.display(),
            model.vectorizer.vocabulary_size(),
            model.classes().len()
        );
        Ok(model)
    }
}

impl Default for TextClassifier {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_FEATURES), DEFAULT_ALPHA)
    }
}
