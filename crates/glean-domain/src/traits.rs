//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the document pipeline and
//! infrastructure. Implementations live in other crates and are injected.

use crate::{Document, DocumentId, DocumentSummary, QaEntry};

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (glean-llm). From the pipeline's
/// point of view the call is synchronous; callers decide which thread runs it.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for a system prompt and a user prompt
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error>;

    /// Name of the backing model, for reporting
    fn model_name(&self) -> &str {
        "llm"
    }
}

impl<T: LlmProvider + ?Sized> LlmProvider for &T {
    type Error = T::Error;

    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        (**self).generate(system_prompt, user_prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Trait for storing ingested documents
///
/// Implemented by the serving layer (glean-service). Implementations must
/// serialize `append_chat` calls per document; different documents may be
/// mutated concurrently.
pub trait DocumentRegistry {
    /// Error type for registry operations
    type Error;

    /// Store a document, replacing any previous document with the same id
    fn insert(&self, document: Document) -> Result<(), Self::Error>;

    /// Snapshot of a document
    fn get(&self, id: &DocumentId) -> Result<Option<Document>, Self::Error>;

    /// All registered documents
    fn list(&self) -> Result<Vec<DocumentSummary>, Self::Error>;

    /// Remove a document; returns whether it existed
    fn remove(&self, id: &DocumentId) -> Result<bool, Self::Error>;

    /// Append one entry to a document's chat log; returns whether the document exists
    fn append_chat(&self, id: &DocumentId, entry: QaEntry) -> Result<bool, Self::Error>;

    /// A document's chat log, if the document exists
    fn chat_history(&self, id: &DocumentId) -> Result<Option<Vec<QaEntry>>, Self::Error>;
}
