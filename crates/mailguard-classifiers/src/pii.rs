//! PII/PCI masking and demasking
//!
//! Masking runs an ordered list of recognizer stages over a `(text,
//! entities)` state. Each stage sees the text produced by the previous one,
//! so:
//!
//! - spans masked by an earlier stage can no longer be matched by a later one
//!   (a card number masked as `credit_debit_no` is never re-read as a CVV);
//! - recorded `position`s are offsets into the text at the moment of
//!   detection and drift from both the original input and the final masked
//!   text once earlier placeholders change lengths.

use crate::name::ContextualNameRecognizer;
use crate::patterns::{PlaceholderGuard, RegexRecognizer, PATTERN_ORDER};
use crate::recognizer::{MaskState, Recognizer};
use mailguard_core::{Entity, EntityKind, MaskResult, Result};
use std::sync::Arc;
use tracing::debug;

/// Ordered masking pipeline
#[derive(Clone)]
pub struct PiiMasker {
    stages: Vec<Arc<dyn Recognizer>>,
}

impl PiiMasker {
    /// Create the default masker: contextual names, then the regex inventory
    /// in `email, phone_number, dob, aadhar_num, credit_debit_no, cvv_no,
    /// expiry_no` order
    pub fn new() -> Result<Self> {
        let guard = PlaceholderGuard::new()?;
        let mut stages: Vec<Arc<dyn Recognizer>> = vec![Arc::new(ContextualNameRecognizer::new()?)];

        for (kind, pattern) in PATTERN_ORDER {
            let recognizer = RegexRecognizer::new(kind, pattern, guard.clone())?;
            let recognizer = if kind == EntityKind::AadharNum {
                recognizer.standalone()
            } else {
                recognizer
            };
            stages.push(Arc::new(recognizer));
        }

        Ok(Self { stages })
    }

    /// Create a masker from custom stages, run in the given order
    pub fn with_stages(stages: Vec<Arc<dyn Recognizer>>) -> Self {
        Self { stages }
    }

    /// Names of the stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Detect and mask every entity in `text`
    pub fn mask(&self, text: &str) -> MaskResult {
        let state = self
            .stages
            .iter()
            .fold(MaskState::new(text), |state, stage| {
                let before = state.entities.len();
                let state = stage.apply(state);
                let found = state.entities.len() - before;
                if found > 0 {
                    debug!(stage = stage.name(), found, "Recognizer masked entities");
                }
                state
            });

        state.into_result()
    }
}

/// Restore original values into masked text
///
/// Entities are applied in list order; each replaces the first remaining
/// occurrence of its placeholder. A placeholder that is no longer present is
/// skipped. Names masked at several places are only restored at the first
/// one, and literal text that happens to look like a placeholder is
/// indistinguishable from a real one.
pub fn demask(masked_text: &str, entities: &[Entity]) -> String {
    entities.iter().fold(masked_text.to_string(), |text, entity| {
        let tag = entity.placeholder();
        if text.contains(tag) {
            text.replacen(tag, &entity.entity, 1)
        } else {
            text
        }
    })
}
