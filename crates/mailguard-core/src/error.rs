//! Error types for MailGuard

/// Result type alias using MailGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MailGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request text failed validation before entering the pipeline
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No trained model is loaded
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model fitting or inference errors
    #[error("model error: {0}")]
    Model(String),

    /// Missing, corrupt, or incompatible model artifacts
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Training dataset errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new input validation error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new model-unavailable error
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
