//! Recognizer trait and masking state

use mailguard_core::{Entity, EntityKind, MaskResult};

/// Trait for all PII/PCI recognizers
///
/// A recognizer is one stage of the masking pipeline. It receives the
/// working text together with every entity found by earlier stages and
/// returns the state with its own detections recorded and masked. Later
/// stages only ever see text that earlier stages already masked.
pub trait Recognizer: Send + Sync {
    /// Apply this stage to the masking state
    fn apply(&self, state: MaskState) -> MaskState;

    /// Get the recognizer name
    fn name(&self) -> &str;

    /// Entity kind this recognizer emits
    fn kind(&self) -> EntityKind;
}

/// Working state threaded through the recognizer stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskState {
    /// Text with every detection so far replaced by its placeholder
    pub text: String,

    /// Entities recorded so far, in detection order
    pub entities: Vec<Entity>,
}

impl MaskState {
    /// Create the initial state for a raw input
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entities: Vec::new(),
        }
    }

    /// Record an entity
    pub fn record(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Finish the pass
    pub fn into_result(self) -> MaskResult {
        MaskResult {
            masked_text: self.text,
            entities: self.entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseWordRecognizer;

    impl Recognizer for UppercaseWordRecognizer {
        fn apply(&self, mut state: MaskState) -> MaskState {
            if let Some(start) = state.text.find("SECRET") {
                state.record(Entity::new(start, start + 6, self.kind(), "SECRET"));
                state.text = state.text.replacen("SECRET", self.kind().placeholder(), 1);
            }
            state
        }

        fn name(&self) -> &str {
            "uppercase"
        }

        fn kind(&self) -> EntityKind {
            EntityKind::CvvNo
        }
    }

    #[test]
    fn test_state_threading() {
        let recognizer = UppercaseWordRecognizer;
        let state = recognizer.apply(MaskState::new("the SECRET word"));

        let result = state.into_result();
        assert_eq!(result.masked_text, "the [cvv_no] word");
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].position, (4, 10));
    }
}
