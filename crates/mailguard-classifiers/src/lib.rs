//! MailGuard Classifiers
//!
//! PII/PCI masking and email categorization.
//!
//! Components are organized in the order an email passes through them:
//! - Recognizers (contextual name rule, then regex rules) replace sensitive
//!   spans with placeholder tags and record what they removed
//! - Normalization lowercases, tokenizes and drops stopwords
//! - A TF-IDF vectorizer feeds a Multinomial Naive Bayes classifier whose
//!   class codes are mapped back to category names by the label codec
//!
//! Training lives here too, so the same masking and normalization code runs
//! offline and at inference time.

pub mod config;
pub mod label;
pub mod model;
pub mod naive_bayes;
pub mod name;
pub mod normalize;
pub mod patterns;
pub mod pii;
pub mod pipeline;
pub mod recognizer;
pub mod report;
pub mod stopwords;
pub mod tfidf;
pub mod trainer;

pub use config::{ArtifactConfig, ClassifierConfig, TrainingConfig};
pub use label::LabelCodec;
pub use model::TextClassifier;
pub use naive_bayes::MultinomialNb;
pub use name::ContextualNameRecognizer;
pub use normalize::normalize;
pub use patterns::{PlaceholderGuard, RegexRecognizer};
pub use pii::{demask, PiiMasker};
pub use pipeline::{validate_body, EmailPipeline};
pub use recognizer::{MaskState, Recognizer};
pub use report::ClassificationReport;
pub use tfidf::TfidfVectorizer;
pub use trainer::{load_dataset, LabeledEmail, Trainer, TrainingOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ArtifactConfig, ClassifierConfig};
    pub use crate::pii::{demask, PiiMasker};
    pub use crate::pipeline::EmailPipeline;
    pub use crate::recognizer::Recognizer;
    pub use crate::trainer::{Trainer, TrainingOutcome};
}
