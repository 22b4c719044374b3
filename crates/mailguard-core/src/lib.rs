//! MailGuard Core
//!
//! Core types and error handling shared across MailGuard components.
//!
//! This crate provides:
//! - Entity records produced by PII/PCI masking
//! - Request and response records for email classification
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ClassifiedEmail, EmailRequest, Entity, EntityKind, MaskResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ClassifiedEmail, EmailRequest, Entity, EntityKind, MaskResult};
}
