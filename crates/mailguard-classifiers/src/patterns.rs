//! Regex-based PII/PCI recognizers
//!
//! Each recognizer scans the working text for one entity kind and masks
//! what it finds before the next recognizer runs. The pattern families for
//! phone numbers, card numbers and CVVs overlap; the fixed stage order in
//! [`crate::pii::PiiMasker`] is what keeps them apart.

use crate::recognizer::{MaskState, Recognizer};
use aho_corasick::AhoCorasick;
use mailguard_core::{Entity, EntityKind, Error, Result};
use regex::Regex;
use tracing::debug;

/// `local@domain.tld`
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

/// Indian mobile numbers (optional `+91`/`91`/`0` prefix, leading 7/8/9,
/// contiguous or split 5-5), `+CC` international numbers, grouped
/// `(ddd) ddd-dddd` style numbers, and `0`-prefixed STD landlines
///
/// None of the grouped shapes fit a 4-4-4-4 card or 4-4-4 Aadhaar layout.
pub const PHONE_PATTERN: &str = r"(?x)
      (?:\+91[-\s]?|\b(?:91[-\s]?|0)?)[789]\d{4}[-\s]?\d{5}\b
    | \+\d{1,3}[-.\s]?(?:\(\d{1,4}\)|\d{1,4})(?:[-.\s]?\d{2,4}){1,4}\b
    | (?:\(\d{3}\)\s?|\b\d{3}[-.\s])\d{3}[-.\s]\d{4}\b
    | \b0\d{2,4}[-\s]\d{3,4}[-\s]\d{4}\b
";

/// `DD/MM/YYYY` or `DD-MM-YYYY`
pub const DOB_PATTERN: &str = r"\b\d{2}[/-]\d{2}[/-]\d{4}\b";

/// Space-grouped 12-digit Aadhaar number
pub const AADHAR_PATTERN: &str = r"\b\d{4} \d{4} \d{4}\b";

/// 13 to 16 digits, optionally separated by spaces or hyphens
pub const CREDIT_DEBIT_PATTERN: &str = r"\b(?:\d[ -]*?){13,16}\b";

/// Exactly three digits
pub const CVV_PATTERN: &str = r"\b\d{3}\b";

/// `MM/YY`
pub const EXPIRY_PATTERN: &str = r"\b(?:0[1-9]|1[0-2])/[0-9]{2}\b";

/// Regex recognizers in the order they must run
pub const PATTERN_ORDER: [(EntityKind, &str); 7] = [
    (EntityKind::Email, EMAIL_PATTERN),
    (EntityKind::PhoneNumber, PHONE_PATTERN),
    (EntityKind::Dob, DOB_PATTERN),
    (EntityKind::AadharNum, AADHAR_PATTERN),
    (EntityKind::CreditDebitNo, CREDIT_DEBIT_PATTERN),
    (EntityKind::CvvNo, CVV_PATTERN),
    (EntityKind::ExpiryNo, EXPIRY_PATTERN),
];

/// Detects placeholder markers inside a candidate match
///
/// A candidate containing `[`, `]` or a placeholder tag overlaps text that
/// an earlier stage already masked and must not be masked again.
#[derive(Clone, Debug)]
pub struct PlaceholderGuard {
    markers: AhoCorasick,
}

impl PlaceholderGuard {
    /// Build a guard over the bracket characters and every placeholder tag
    pub fn new() -> Result<Self> {
        let mut markers: Vec<&str> = vec!["[", "]"];
        markers.extend(EntityKind::ALL.iter().map(|kind| kind.placeholder()));

        let markers = AhoCorasick::builder()
            .build(&markers)
            .map_err(|e| Error::internal(format!("Failed to build placeholder matcher: {}", e)))?;

        Ok(Self { markers })
    }

    /// Whether the candidate touches already-masked text
    pub fn is_masked(&self, candidate: &str) -> bool {
        self.markers.is_match(candidate)
    }
}

/// Recognizer backed by a single regular expression
pub struct RegexRecognizer {
    name: String,
    kind: EntityKind,
    regex: Regex,
    guard: PlaceholderGuard,
    standalone: bool,
}

impl RegexRecognizer {
    /// Create a new regex recognizer
    pub fn new(kind: EntityKind, pattern: &str, guard: PlaceholderGuard) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::internal(format!("Failed to compile {} regex: {}", kind, e))
        })?;

        Ok(Self {
            name: format!("{}_pattern", kind),
            kind,
            regex,
            guard,
            standalone: false,
        })
    }

    /// Reject matches that sit next to another four-digit group
    ///
    /// The Aadhaar pattern matches the first twelve digits of a grouped
    /// sixteen-digit card number; with this set the card number is left for
    /// the card recognizer. Shorter neighbouring groups such as a CVV do not
    /// count.
    pub fn standalone(mut self) -> Self {
        self.standalone = true;
        self
    }

    fn continues_digit_run(text: &str, start: usize, end: usize) -> bool {
        fn four_digit_group(mut chars: impl Iterator<Item = char>) -> bool {
            match chars.next() {
                Some(' ') | Some('-') => chars.take_while(|c| c.is_ascii_digit()).count() == 4,
                _ => false,
            }
        }

        four_digit_group(text[end..].chars()) || four_digit_group(text[..start].chars().rev())
    }
}

impl Recognizer for RegexRecognizer {
    fn apply(&self, mut state: MaskState) -> MaskState {
        // Candidates come from the text as it stood when this stage began.
        let candidates: Vec<(usize, usize, String)> = self
            .regex
            .find_iter(&state.text)
            .filter(|m| !(self.standalone && Self::continues_digit_run(&state.text, m.start(), m.end())))
            .map(|m| (m.start(), m.end(), m.as_str().to_string()))
            .collect();

        for (start, end, literal) in candidates {
            if self.guard.is_masked(&literal) {
                debug!(recognizer = %self.name, "Skipping candidate overlapping a placeholder");
                continue;
            }

            state.text = state.text.replacen(&literal, self.kind.placeholder(), 1);
            state.record(Entity::new(start, end, self.kind, literal));
        }

        state
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer(kind: EntityKind) -> RegexRecognizer {
        let (_, pattern) = PATTERN_ORDER
            .iter()
            .find(|(k, _)| *k == kind)
            .unwrap();
        RegexRecognizer::new(kind, pattern, PlaceholderGuard::new().unwrap()).unwrap()
    }

    fn literals(state: &MaskState) -> Vec<&str> {
        state.entities.iter().map(|e| e.entity.as_str()).collect()
    }

    #[test]
    fn test_email_detection() {
        let state = recognizer(EntityKind::Email).apply(MaskState::new("Contact me at jane.doe@example.com today"));

        assert_eq!(literals(&state), vec!["jane.doe@example.com"]);
        assert_eq!(state.entities[0].position, (14, 34));
        assert_eq!(state.text, "Contact me at [email] today");
    }

    #[test]
    fn test_phone_formats() {
        let phone = recognizer(EntityKind::PhoneNumber);

        let state = phone.apply(MaskState::new("Call 9876543210 now"));
        assert_eq!(literals(&state), vec!["9876543210"]);

        let state = phone.apply(MaskState::new("Call +91 9876543210 now"));
        assert_eq!(literals(&state), vec!["+91 9876543210"]);

        let state = phone.apply(MaskState::new("Call me at 555-123-4567"));
        assert_eq!(literals(&state), vec!["555-123-4567"]);

        let state = phone.apply(MaskState::new("Office (555) 123-4567"));
        assert_eq!(literals(&state), vec!["(555) 123-4567"]);

        let state = phone.apply(MaskState::new("Call +44 20 7946 0958 please"));
        assert_eq!(literals(&state), vec!["+44 20 7946 0958"]);

        let state = phone.apply(MaskState::new("Call 98765 43210 today"));
        assert_eq!(literals(&state), vec!["98765 43210"]);
        assert_eq!(state.text, "Call [phone_number] today");

        let state = phone.apply(MaskState::new("Call +91 98765 43210 today"));
        assert_eq!(literals(&state), vec!["+91 98765 43210"]);

        let state = phone.apply(MaskState::new("Office 080-2345-6789"));
        assert_eq!(literals(&state), vec!["080-2345-6789"]);

        let state = phone.apply(MaskState::new("Office 011 2345 6789"));
        assert_eq!(literals(&state), vec!["011 2345 6789"]);
    }

    #[test]
    fn test_phone_ignores_card_groups() {
        let phone = recognizer(EntityKind::PhoneNumber);

        let state = phone.apply(MaskState::new("Card 4111 1111 1111 1111"));
        assert!(state.entities.is_empty());

        let state = phone.apply(MaskState::new("Card 9876 5432 1098 7654"));
        assert!(state.entities.is_empty());

        let state = phone.apply(MaskState::new("Aadhar 9876 5432 1098"));
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_dob_formats() {
        let dob = recognizer(EntityKind::Dob);

        let state = dob.apply(MaskState::new("Born 12/05/1990 and 03-11-1985"));
        assert_eq!(literals(&state), vec!["12/05/1990", "03-11-1985"]);
        assert_eq!(state.text, "Born [dob] and [dob]");
    }

    #[test]
    fn test_aadhar_standalone() {
        let aadhar = recognizer(EntityKind::AadharNum).standalone();

        let state = aadhar.apply(MaskState::new("Aadhar: 1234 5678 9012."));
        assert_eq!(literals(&state), vec!["1234 5678 9012"]);

        let state = aadhar.apply(MaskState::new("Card 4111 1111 1111 1111"));
        assert!(state.entities.is_empty());
        assert_eq!(state.text, "Card 4111 1111 1111 1111");

        let state = aadhar.apply(MaskState::new("Aadhar 1234 5678 9012 123"));
        assert_eq!(literals(&state), vec!["1234 5678 9012"]);
        assert_eq!(state.text, "Aadhar [aadhar_num] 123");
    }

    #[test]
    fn test_card_separators() {
        let card = recognizer(EntityKind::CreditDebitNo);

        let state = card.apply(MaskState::new("pay with 4111-1111-1111-1111 please"));
        assert_eq!(literals(&state), vec!["4111-1111-1111-1111"]);

        let state = card.apply(MaskState::new("pay with 4111111111111 please"));
        assert_eq!(literals(&state), vec!["4111111111111"]);
    }

    #[test]
    fn test_expiry_month_range() {
        let expiry = recognizer(EntityKind::ExpiryNo);

        let state = expiry.apply(MaskState::new("expires 08/27"));
        assert_eq!(literals(&state), vec!["08/27"]);

        let state = expiry.apply(MaskState::new("expires 13/27"));
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_repeated_value_masks_each_occurrence() {
        let state = recognizer(EntityKind::CvvNo).apply(MaskState::new("123 then 123"));

        assert_eq!(literals(&state), vec!["123", "123"]);
        assert_eq!(state.entities[0].position, (0, 3));
        assert_eq!(state.entities[1].position, (9, 12));
        assert_eq!(state.text, "[cvv_no] then [cvv_no]");
    }

    #[test]
    fn test_placeholder_guard() {
        let guard = PlaceholderGuard::new().unwrap();
        assert!(guard.is_masked("[email]"));
        assert!(guard.is_masked("123]"));
        assert!(!guard.is_masked("4111 1111 1111 1111"));
    }
}
