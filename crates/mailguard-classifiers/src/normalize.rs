//! Text normalization for classification
//!
//! Lowercases, splits on Unicode word boundaries (UAX #29), and keeps only
//! purely alphanumeric tokens that are not English stopwords. Placeholders
//! survive as their bare label (`[email]` becomes `email`) except for
//! underscore-joined ones such as `[full_name]`, which are dropped.

use crate::stopwords::is_stopword;
use unicode_segmentation::UnicodeSegmentation;

/// Normalize text into a space-joined token string
pub fn normalize(text: &str) -> String {
    tokens(text).join(" ")
}

/// Normalized tokens of `text`, in order
pub fn tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .unicode_words()
        .filter(|word| is_alphanumeric(word) && !is_stopword(word))
        .map(str::to_string)
        .collect()
}

fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}
