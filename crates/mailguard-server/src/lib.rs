//! MailGuard Server
//!
//! HTTP service exposing PII/PCI masking, demasking and email
//! classification. Model artifacts are loaded once at startup and shared
//! read-only by every request.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServerConfig};
pub use routes::{create_router, AppError, DemaskRequest, DemaskResponse, MaskResponse};
pub use state::AppState;
