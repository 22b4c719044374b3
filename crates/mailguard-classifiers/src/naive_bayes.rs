//! Multinomial Naive Bayes over sparse TF-IDF rows

use crate::tfidf::SparseVector;
use mailguard_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest smoothing value accepted; smaller values are clamped
const MIN_ALPHA: f64 = 1e-10;

/// Multinomial Naive Bayes classifier
///
/// Only classes that occur in the training labels are scored, so a class
/// absent from a training split can never be predicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Additive smoothing parameter
    alpha: f64,

    /// Class codes seen during fitting, ascending
    classes: Vec<usize>,

    /// `ln P(class)` per entry of `classes`
    class_log_prior: Vec<f64>,

    /// `ln P(feature | class)`, one row per entry of `classes`
    feature_log_prob: Vec<Vec<f64>>,

    /// Feature dimension
    n_features: usize,
}

impl MultinomialNb {
    /// Create an unfitted classifier
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            classes: Vec::new(),
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
            n_features: 0,
        }
    }

    /// Fit on rows `x` with class codes `y`
    pub fn fit(&mut self, x: &[SparseVector], y: &[usize], n_features: usize) -> Result<()> {
        if x.is_empty() {
            return Err(Error::model("cannot fit classifier without samples"));
        }
        if x.len() != y.len() {
            return Err(Error::model(format!(
                "{} samples but {} labels",
                x.len(),
                y.len()
            )));
        }
        if !(self.alpha >= 0.0) {
            return Err(Error::model(format!("alpha must be non-negative, got {}", self.alpha)));
        }
        let alpha = self.alpha.max(MIN_ALPHA);

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut class_count = vec![0.0f64; classes.len()];
        let mut feature_count = vec![vec![0.0f64; n_features]; classes.len()];

        for (row, &label) in x.iter().zip(y) {
            // `classes` is sorted and contains every label.
            let Ok(c) = classes.binary_search(&label) else {
                continue;
            };
            class_count[c] += 1.0;
            for &(index, weight) in row {
                if index >= n_features {
                    return Err(Error::model(format!(
                        "feature index {} out of range for {} features",
                        index, n_features
                    )));
                }
                feature_count[c][index] += weight;
            }
        }

        let total = x.len() as f64;
        self.class_log_prior = class_count.iter().map(|count| (count / total).ln()).collect();
        self.feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let denominator = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
                counts
                    .into_iter()
                    .map(|count| (count + alpha).ln() - denominator)
                    .collect()
            })
            .collect();
        self.classes = classes;
        self.n_features = n_features;

        Ok(())
    }

    /// Joint log-likelihood per fitted class, aligned with [`Self::classes`]
    pub fn joint_log_likelihood(&self, row: &SparseVector) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + row
                        .iter()
                        .filter_map(|&(index, weight)| log_probs.get(index).map(|lp| lp * weight))
                        .sum::<f64>()
            })
            .collect()
    }

    /// Most likely class code; ties resolve to the lowest code
    pub fn predict(&self, row: &SparseVector) -> Option<usize> {
        let scores = self.joint_log_likelihood(row);
        let mut best: Option<(usize, f64)> = None;

        for (position, score) in scores.into_iter().enumerate() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((position, score));
            }
        }

        best.map(|(position, _)| self.classes[position])
    }

    /// Posterior probabilities per fitted class, aligned with [`Self::classes`]
    pub fn predict_proba(&self, row: &SparseVector) -> Vec<f64> {
        let scores = self.joint_log_likelihood(row);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / sum).collect()
    }

    /// Class codes seen during fitting
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Feature dimension
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Check internal consistency after deserialization
    pub(crate) fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(Error::artifact("classifier has no fitted classes"));
        }
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            return Err(Error::artifact("classifier parameter shapes do not match its classes"));
        }
        if self.feature_log_prob.iter().any(|row| row.len() != self.n_features) {
            return Err(Error::artifact("classifier feature rows do not match its dimension"));
        }
        Ok(())
    }
}
