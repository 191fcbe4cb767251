//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error(transparent)]
    Core(#[from] glean_core::CoreError),

    /// Document service error
    #[error(transparent)]
    Service(#[from] glean_service::ServiceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// PDF, Word or Excel content could not be decoded
    #[error("Failed to read {kind} '{path}': {message}")]
    Decode {
        /// Detected kind
        kind: glean_core::DocumentKind,
        /// Input path
        path: String,
        /// Decoder message
        message: String,
    },

    /// Blocking worker failed
    #[error("Worker error: {0}")]
    Worker(String),

    /// Line editor failure
    #[error("Editor error: {0}")]
    Editor(String),
}
