use thiserror::Error;

/// Top-level error type for the Mediflow system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// MediflowError` so that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MediflowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MediflowError {
    fn from(err: toml::de::Error) -> Self {
        MediflowError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MediflowError {
    fn from(err: toml::ser::Error) -> Self {
        MediflowError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MediflowError {
    fn from(err: serde_json::Error) -> Self {
        MediflowError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Mediflow operations.
pub type Result<T> = std::result::Result<T, MediflowError>;
