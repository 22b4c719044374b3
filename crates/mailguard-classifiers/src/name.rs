//! Contextual full-name recognizer

use crate::recognizer::{MaskState, Recognizer};
use mailguard_core::{Entity, EntityKind, Error, Result};
use regex::Regex;
use tracing::debug;

/// Trigger phrase (any case) followed by two or three capitalized words
pub const NAME_PATTERN: &str =
    r"(?i:my name is|my full name is)\s+([A-Z][a-z]+(?: [A-Z][a-z]+){1,2})";

/// Masks names introduced by "my name is" / "my full name is"
///
/// Unlike the regex recognizers, a detected name is masked everywhere it
/// occurs in the text, and its recorded position is that of the first
/// occurrence of the name, which need not be the occurrence that followed
/// the trigger phrase.
pub struct ContextualNameRecognizer {
    regex: Regex,
}

impl ContextualNameRecognizer {
    /// Create a new name recognizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            regex: Regex::new(NAME_PATTERN)
                .map_err(|e| Error::internal(format!("Failed to compile name regex: {}", e)))?,
        })
    }
}

impl Recognizer for ContextualNameRecognizer {
    fn apply(&self, mut state: MaskState) -> MaskState {
        let names: Vec<String> = self
            .regex
            .captures_iter(&state.text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        for name in names {
            // An earlier match of the same name already masked every occurrence.
            let Some(start) = state.text.find(&name) else {
                debug!("Name already masked by an earlier match");
                continue;
            };

            state.record(Entity::new(start, start + name.len(), EntityKind::FullName, name.as_str()));
            state.text = state.text.replace(&name, EntityKind::FullName.placeholder());
        }

        state
    }

    fn name(&self) -> &str {
        "contextual_name"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::FullName
    }
}
