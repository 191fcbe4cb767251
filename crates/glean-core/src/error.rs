//! Error types for the document pipeline

use thiserror::Error;

/// Longest raw-text prefix carried by [`CoreError::MalformedOutput`]
pub const PREVIEW_CHARS: usize = 1000;

/// Errors that can occur while ingesting, querying or extracting
#[derive(Error, Debug)]
pub enum CoreError {
    /// Model output contained no recoverable JSON object
    #[error("Model returned unusable output (no JSON object found): {preview}")]
    MalformedOutput {
        /// Bounded prefix of the raw model text
        preview: String,
    },

    /// The LLM call itself failed
    #[error("LLM unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Document type is not supported
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Unknown document or chunk
    #[error("Not found: {0}")]
    NotFound(String),

    /// Extraction for a document failed upstream
    #[error("Extraction failed for document '{document_id}': {message}")]
    ExtractionFailed {
        /// Document being extracted
        document_id: String,
        /// Upstream message
        message: String,
    },

    /// Question answering for a document failed upstream
    #[error("Question failed for document '{document_id}': {message}")]
    AskFailed {
        /// Document being queried
        document_id: String,
        /// Upstream message
        message: String,
    },

    /// No text could be extracted from the input
    #[error("No text extracted from '{0}'")]
    EmptyDocument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Build a `MalformedOutput` error carrying a bounded prefix of `raw`
    pub fn malformed(raw: &str) -> Self {
        CoreError::MalformedOutput {
            preview: raw.chars().take(PREVIEW_CHARS).collect(),
        }
    }

    /// Pipeline stage the error belongs to, for user-facing reports
    pub fn stage(&self) -> &'static str {
        match self {
            CoreError::MalformedOutput { .. } => "parse",
            CoreError::UpstreamUnavailable(_) => "llm",
            CoreError::UnsupportedInput(_) | CoreError::EmptyDocument(_) => "ingest",
            CoreError::NotFound(_) => "lookup",
            CoreError::ExtractionFailed { .. } => "extract",
            CoreError::AskFailed { .. } => "ask",
            CoreError::Config(_) => "config",
        }
    }
}
