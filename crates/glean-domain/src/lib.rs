//! Glean Domain Layer
//!
//! Value types and trait seams shared by every other Glean crate. Nothing in
//! here performs I/O: the document pipeline, the LLM providers and the
//! serving layer all build on these definitions.
//!
//! ## Key Concepts
//!
//! - **Chunk**: a bounded, immutable slice of a document's text
//! - **Document**: an ingested file with its chunks and an append-only chat log
//! - **Taxonomy**: the closed set of contract sections extraction fills in
//! - **Clause**: a labeled contract excerpt with a confidence score
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - `LlmProvider` and `DocumentRegistry` are implemented by infrastructure crates
//!   and injected into the pipeline, never reached through global state

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod clause;
pub mod document;
pub mod taxonomy;
pub mod traits;

// Re-exports for convenience
pub use chunk::Chunk;
pub use clause::{Clause, ClauseReport, Summaries};
pub use document::{Document, DocumentId, DocumentSummary, QaEntry};
pub use taxonomy::{Fields, Section, SectionShape, SectionValue, Taxonomy};
pub use traits::{DocumentRegistry, LlmProvider};
