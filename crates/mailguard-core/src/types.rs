//! Core types for MailGuard

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a detected PII/PCI span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Person's full name (contextual rule)
    FullName,
    /// Email address
    Email,
    /// Phone number (Indian or grouped international formats)
    PhoneNumber,
    /// Date of birth
    Dob,
    /// Aadhaar identity number
    AadharNum,
    /// Credit or debit card number
    CreditDebitNo,
    /// Card verification value
    CvvNo,
    /// Card expiry date
    ExpiryNo,
}

impl EntityKind {
    /// Every kind, in detection order
    pub const ALL: [EntityKind; 8] = [
        Self::FullName,
        Self::Email,
        Self::PhoneNumber,
        Self::Dob,
        Self::AadharNum,
        Self::CreditDebitNo,
        Self::CvvNo,
        Self::ExpiryNo,
    ];

    /// Wire label for this kind
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::PhoneNumber => "phone_number",
            Self::Dob => "dob",
            Self::AadharNum => "aadhar_num",
            Self::CreditDebitNo => "credit_debit_no",
            Self::CvvNo => "cvv_no",
            Self::ExpiryNo => "expiry_no",
        }
    }

    /// Bracketed tag substituted for a masked span
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::FullName => "[full_name]",
            Self::Email => "[email]",
            Self::PhoneNumber => "[phone_number]",
            Self::Dob => "[dob]",
            Self::AadharNum => "[aadhar_num]",
            Self::CreditDebitNo => "[credit_debit_no]",
            Self::CvvNo => "[cvv_no]",
            Self::ExpiryNo => "[expiry_no]",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected span of sensitive text
///
/// `position` holds byte offsets into the text as it stood when the
/// recognizer ran, not into the original input: earlier recognizers may
/// already have replaced spans with placeholders of a different length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Byte span `(start, end)` in the working text at detection time
    pub position: (usize, usize),

    /// What kind of data was found
    pub classification: EntityKind,

    /// The literal text that was replaced
    pub entity: String,
}

impl Entity {
    /// Create a new entity record
    pub fn new(start: usize, end: usize, classification: EntityKind, entity: impl Into<String>) -> Self {
        Self {
            position: (start, end),
            classification,
            entity: entity.into(),
        }
    }

    /// Placeholder tag this entity was replaced with
    pub fn placeholder(&self) -> &'static str {
        self.classification.placeholder()
    }
}

/// Output of a masking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskResult {
    /// Text with every detected span replaced by its placeholder
    pub masked_text: String,

    /// Entities in detection order (not position order)
    pub entities: Vec<Entity>,
}

impl MaskResult {
    /// Number of masked entities of the given kind
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|e| e.classification == kind)
            .count()
    }
}

/// Inference request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    /// Raw email text
    pub input_email_body: String,
}

/// Inference response record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEmail {
    /// Raw email text as received
    pub input_email_body: String,

    /// Entities masked out of the email, in detection order
    pub list_of_masked_entities: Vec<Entity>,

    /// Email text with placeholders
    pub masked_email: String,

    /// Predicted category label
    pub category_of_the_email: String,
}
