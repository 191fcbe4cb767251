//! Glean Core
//!
//! Chunking, lexical retrieval and structured extraction for long legal
//! documents.
//!
//! # Overview
//!
//! Decoded document text is split into overlapping chunks, questions are
//! answered from the chunks that share the most keywords with the query, and
//! free-form model output is turned into a fixed taxonomy of contract
//! sections or into labeled clauses.
//!
//! # Architecture
//!
//! ```text
//! Text → TextSplitter → Chunks ─┬→ LexicalRanker → QA prompt → LLM → Answer
//!                               └→ head chunks → extraction prompt → LLM → TaxonomyMapper
//! ```
//!
//! # Components
//!
//! - **TextSplitter**: recursive separator splitting with overlap
//! - **LexicalRanker**: distinct-keyword scoring with document-order ties
//! - **parse_json_loose**: JSON object recovery from wrapped model output
//! - **TaxonomyMapper**: heading-driven bucketing of model text
//! - **ExtractionPipeline**: orchestration over an injected `LlmProvider`
//!
//! # Example Usage
//!
//! ```
//! use glean_core::ExtractionPipeline;
//! use glean_domain::{DocumentId, Section};
//! use glean_llm::MockProvider;
//!
//! let llm = MockProvider::new("CONFIDENTIALITY\nDuration: 5 years");
//! let pipeline = ExtractionPipeline::with_defaults(llm);
//!
//! let document = pipeline
//!     .ingest(DocumentId::new("msa"), "msa.txt", "The parties keep all terms confidential.")
//!     .unwrap();
//! let payload = pipeline.extract(&document).unwrap();
//!
//! assert_eq!(
//!     payload.taxonomy.mapping(Section::Confidentiality).unwrap().get("Duration"),
//!     Some("5 years")
//! );
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod ingest;
mod parser;
mod pipeline;
mod prompt;
mod ranker;
mod splitter;
mod taxonomy;
mod types;


pub use config::{estimate_tokens, PipelineConfig, DEFAULT_SEPARATORS};
pub use error::{CoreError, PREVIEW_CHARS};
pub use ingest::{ingest_text, DocumentKind};
pub use parser::{parse_json_loose, parse_loose_as};
pub use pipeline::ExtractionPipeline;
pub use prompt::{truncate_for_prompt, Prompt, TRUNCATION_MARKER};
pub use ranker::{LexicalRanker, ScoredChunk};
pub use splitter::TextSplitter;
pub use taxonomy::{map_to_taxonomy, TaxonomyMapper};
pub use types::{Answer, ExtractionPayload};
