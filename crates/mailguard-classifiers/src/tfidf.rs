//! TF-IDF vectorizer
//!
//! Tokens are runs of two or more word characters, lowercased. The
//! vocabulary is capped at `max_features` terms by corpus frequency and
//! indexed alphabetically. Rows are raw counts scaled by smoothed IDF
//! (`ln((1 + n) / (1 + df)) + 1`) and L2-normalized.

use mailguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Sparse feature row: `(feature index, weight)` sorted by index
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF vectorizer with a frozen vocabulary after fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Vocabulary cap, `None` for unlimited
    max_features: Option<usize>,

    /// Term -> feature index
    vocabulary: BTreeMap<String, usize>,

    /// Inverse document frequency per feature index
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer
    pub fn new(max_features: Option<usize>) -> Self {
        Self {
            max_features,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Learn vocabulary and IDF weights from a corpus
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(Error::model("cannot fit vectorizer on an empty corpus"));
        }

        let mut term_frequency: HashMap<String, u64> = HashMap::new();
        let mut document_frequency: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            for (term, count) in count_terms(doc) {
                *term_frequency.entry(term.clone()).or_insert(0) += count;
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if term_frequency.is_empty() {
            return Err(Error::model(
                "empty vocabulary; documents contain no terms of two or more characters",
            ));
        }

        let mut selected: Vec<(String, u64)> = term_frequency.into_iter().collect();
        if let Some(limit) = self.max_features {
            if selected.len() > limit {
                selected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                selected.truncate(limit);
            }
        }
        selected.sort_by(|a, b| a.0.cmp(&b.0));

        let n_documents = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(selected.len());

        for (index, (term, _)) in selected.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_documents) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;

        Ok(())
    }

    /// Fit on a corpus and return its rows
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        Ok(documents.iter().map(|doc| self.transform(doc)).collect())
    }

    /// Vectorize a document against the frozen vocabulary; unseen terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for (term, count) in count_terms(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += count as f64;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut row {
                *weight /= norm;
            }
        }

        row
    }

    /// Number of features
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Feature index of a term
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of a feature
    pub fn idf(&self, index: usize) -> Option<f64> {
        self.idf.get(index).copied()
    }

    /// Whether `fit` has run
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Check internal consistency after deserialization
    pub(crate) fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(Error::artifact(format!(
                "vectorizer has {} terms but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        if self.vocabulary.values().any(|&index| index >= self.idf.len()) {
            return Err(Error::artifact("vectorizer term index out of range"));
        }
        Ok(())
    }
}

/// Count analyzer terms in a document
fn count_terms(document: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    let lowered = document.to_lowercase();

    for term in lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|term| term.chars().nth(1).is_some())
    {
        *counts.entry(term.to_string()).or_insert(0) += 1;
    }

    counts
}
