//! Extraction pipeline: chunk selection, LLM call and result mapping

use crate::config::{estimate_tokens, PipelineConfig};
use crate::error::CoreError;
use crate::ingest::ingest_text;
use crate::parser::{parse_json_loose, parse_loose_as};
use crate::prompt::{join_chunks, Prompt};
use crate::ranker::LexicalRanker;
use crate::taxonomy::TaxonomyMapper;
use crate::types::{Answer, ExtractionPayload};
use glean_domain::{
    Chunk, Clause, ClauseReport, Document, DocumentId, LlmProvider, Summaries, Taxonomy,
};
use serde_json::Value;
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrates ingestion, question answering and extraction over an LLM.
///
/// The pipeline holds no document state. Documents are passed in and results
/// returned; recording chat history is up to the caller. The LLM call is the
/// only blocking step and failures are never retried here.
pub struct ExtractionPipeline<L> {
    llm: L,
    config: PipelineConfig,
    ranker: LexicalRanker,
    mapper: TaxonomyMapper,
}

impl<L> ExtractionPipeline<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a pipeline, validating the configuration
    pub fn new(llm: L, config: PipelineConfig) -> Result<Self, CoreError> {
        config.validate().map_err(CoreError::Config)?;
        Ok(Self {
            llm,
            config,
            ranker: LexicalRanker::new(),
            mapper: TaxonomyMapper::new(),
        })
    }

    /// Create a pipeline with the default configuration
    pub fn with_defaults(llm: L) -> Self {
        Self {
            llm,
            config: PipelineConfig::default(),
            ranker: LexicalRanker::new(),
            mapper: TaxonomyMapper::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The LLM provider
    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Chunk decoded text into a new document
    pub fn ingest(
        &self,
        id: DocumentId,
        filename: impl Into<String>,
        text: &str,
    ) -> Result<Document, CoreError> {
        ingest_text(id, filename, text, &self.config)
    }

    /// Extract the taxonomy using the configured chunk count and budget
    pub fn extract(&self, document: &Document) -> Result<ExtractionPayload, CoreError> {
        self.extract_with(document, self.config.max_chunks, self.config.token_budget_chars)
    }

    /// Extract the taxonomy from the head of a document.
    ///
    /// Takes the first `max_chunks` chunks in document order. When their
    /// estimated token count exceeds `token_budget_chars / 4`, only the first
    /// chunk is sent.
    pub fn extract_with(
        &self,
        document: &Document,
        max_chunks: usize,
        token_budget_chars: usize,
    ) -> Result<ExtractionPayload, CoreError> {
        if document.chunks().is_empty() {
            return Err(CoreError::EmptyDocument(document.id().to_string()));
        }

        let selected = select_head(document.chunks(), max_chunks, token_budget_chars);
        let prompt = Prompt::extraction(&selected);

        info!(
            document_id = %document.id(),
            model = self.llm.model_name(),
            "Extracting taxonomy from {} of {} chunks",
            selected.len(),
            document.chunks().len()
        );

        let start = Instant::now();
        let raw_answer = self
            .llm
            .generate(&prompt.system, &prompt.user)
            .map_err(|e| CoreError::ExtractionFailed {
                document_id: document.id().to_string(),
                message: e.to_string(),
            })?;
        let elapsed_seconds = start.elapsed().as_secs_f64();

        let taxonomy = self.read_taxonomy(&raw_answer);
        if taxonomy.is_empty() {
            warn!(document_id = %document.id(), "Model output filled no taxonomy section");
        }
        info!(
            document_id = %document.id(),
            "Extraction complete in {:.2}s",
            elapsed_seconds
        );

        Ok(ExtractionPayload {
            document_id: document.id().clone(),
            raw_answer,
            taxonomy,
            chunks_used: selected.len(),
            elapsed_seconds,
        })
    }

    /// Answer a question from the document's best-matching chunks.
    ///
    /// The document is not modified; append [`Answer::to_entry`] to its chat
    /// log to record the exchange.
    pub fn ask(&self, document: &Document, query: &str) -> Result<Answer, CoreError> {
        let relevant = self.ranker.rank(query, document.chunks(), self.config.top_k);
        let prompt = Prompt::question(&relevant, query);

        debug!(
            document_id = %document.id(),
            "Answering with {} context chunks",
            relevant.len()
        );

        let start = Instant::now();
        let answer = self
            .llm
            .generate(&prompt.system, &prompt.user)
            .map_err(|e| CoreError::AskFailed {
                document_id: document.id().to_string(),
                message: e.to_string(),
            })?;

        Ok(Answer {
            query: query.to_string(),
            answer,
            relevant_chunks: relevant.len(),
            sources: relevant.iter().map(|c| c.source_index()).collect(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Extract labeled clauses from the full document text.
    ///
    /// A reply without a `clauses` array yields no clauses; entries that do
    /// not look like clauses are skipped.
    pub fn extract_clauses(&self, text: &str) -> Result<Vec<Clause>, CoreError> {
        let prompt = Prompt::clauses(text, self.config.prompt_char_limit);
        let raw = self.call(&prompt)?;
        let object = parse_json_loose(&raw)?;

        let Some(Value::Array(entries)) = object.get("clauses") else {
            warn!("Clause reply has no 'clauses' array");
            return Ok(Vec::new());
        };

        let mut clauses = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<Clause>(entry.clone()) {
                Ok(clause) => clauses.push(clause),
                Err(e) => warn!("Skipping clause {}: {}", idx, e),
            }
        }
        info!("Extracted {} clauses", clauses.len());
        Ok(clauses)
    }

    /// Executive, legal and procurement summaries; missing ones are empty
    pub fn summarize(&self, text: &str) -> Result<Summaries, CoreError> {
        let prompt = Prompt::summaries(text, self.config.prompt_char_limit);
        let raw = self.call(&prompt)?;
        let object = parse_json_loose(&raw)?;

        let field = |name: &str| match object.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Ok(Summaries {
            executive: field("executive"),
            legal: field("legal"),
            procurement: field("procurement"),
        })
    }

    /// Clauses and summaries for one document, as persisted by the CLI.
    ///
    /// Blank text is rejected before any LLM call.
    pub fn process(
        &self,
        document_id: &DocumentId,
        input_file: &str,
        document_type: &str,
        text: &str,
    ) -> Result<ClauseReport, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::EmptyDocument(input_file.to_string()));
        }

        info!(document_id = %document_id, "Processing '{}'", input_file);
        let clauses = self.extract_clauses(text)?;
        let summary = self.summarize(text)?;

        Ok(ClauseReport {
            document_id: document_id.to_string(),
            input_file: input_file.to_string(),
            document_type: document_type.to_string(),
            clauses,
            summary,
        })
    }

    fn call(&self, prompt: &Prompt) -> Result<String, CoreError> {
        self.llm
            .generate(&prompt.system, &prompt.user)
            .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))
    }

    /// JSON keyed by section name if the model sent it, heading text otherwise
    fn read_taxonomy(&self, raw: &str) -> Taxonomy {
        if raw.trim_start().starts_with('{') {
            if let Ok(taxonomy) = parse_loose_as::<Taxonomy>(raw) {
                debug!("Model answered with taxonomy JSON");
                return taxonomy;
            }
        }
        self.mapper.map(raw)
    }
}

/// First `max_chunks` chunks, cut to one when over the token budget
fn select_head(chunks: &[Chunk], max_chunks: usize, token_budget_chars: usize) -> Vec<&Chunk> {
    let mut selected: Vec<&Chunk> = chunks.iter().take(max_chunks.max(1)).collect();
    let estimate = estimate_tokens(&join_chunks(&selected));
    let budget = token_budget_chars / 4;
    if estimate > budget && selected.len() > 1 {
        warn!(
            "Estimated {} tokens exceeds budget of {}, using first chunk only",
            estimate, budget
        );
        selected.truncate(1);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use glean_domain::Section;
    use glean_llm::MockProvider;

    fn document(texts: &[&str]) -> Document {
        let chunks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(*t, i))
            .collect();
        Document::new(DocumentId::new("doc-1"), "msa.txt", chunks)
    }

    #[test]
    fn test_extract_maps_taxonomy() {
        let llm = MockProvider::new(
            "Here you go.\nCONFIDENTIALITY\nDuration: 5 years\nRISKS & ASSUMPTIONS\nVendor lock-in",
        );
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let payload = pipeline.extract(&document(&["a", "b", "c"])).unwrap();

        assert_eq!(payload.document_id.as_str(), "doc-1");
        assert_eq!(payload.chunks_used, 2);
        assert_eq!(
            payload.taxonomy.mapping(Section::Confidentiality).unwrap().get("Duration"),
            Some("5 years")
        );
        assert!(payload.raw_answer.starts_with("Here you go."));
    }

    #[test]
    fn test_extract_samples_head_not_ranked() {
        let llm = MockProvider::new("SCOPE\nx");
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        pipeline
            .extract(&document(&["first chunk", "second chunk", "third chunk"]))
            .unwrap();

        let call = &llm.calls()[0];
        assert!(call.user_prompt.contains("first chunk\n\nsecond chunk"));
        assert!(!call.user_prompt.contains("third chunk"));
    }

    #[test]
    fn test_budget_reduction_sends_one_chunk() {
        let llm = MockProvider::new("SCOPE\nx");
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        let big_a = "a".repeat(400);
        let big_b = "b".repeat(400);
        let doc = document(&[big_a.as_str(), big_b.as_str()]);

        // 802 chars ≈ 200 tokens, budget of 400 chars ≈ 100 tokens
        let payload = pipeline.extract_with(&doc, 2, 400).unwrap();

        assert_eq!(payload.chunks_used, 1);
        assert_eq!(llm.call_count(), 1);
        let prompt = &llm.calls()[0].user_prompt;
        assert!(prompt.contains(&big_a));
        assert!(!prompt.contains(&big_b));
    }

    #[test]
    fn test_within_budget_keeps_chunks() {
        let llm = MockProvider::new("SCOPE\nx");
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let payload = pipeline.extract_with(&document(&["a", "b", "c"]), 3, 24_000).unwrap();
        assert_eq!(payload.chunks_used, 3);
    }

    #[test]
    fn test_extract_failure_is_not_retried() {
        let llm = MockProvider::failing("connection refused");
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        let err = pipeline.extract(&document(&["a"])).unwrap_err();

        match err {
            CoreError::ExtractionFailed { document_id, message } => {
                assert_eq!(document_id, "doc-1");
                assert!(message.contains("connection refused"));
            }
            other => panic!("Expected ExtractionFailed, got {:?}", other),
        }
        assert_eq!(llm.call_count(), 1);
    }

    #[test]
    fn test_unrecognized_output_is_empty_taxonomy() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::new("I cannot help."));
        let payload = pipeline.extract(&document(&["a"])).unwrap();
        assert!(payload.taxonomy.is_empty());
    }

    #[test]
    fn test_json_taxonomy_reply_is_accepted() {
        let llm = MockProvider::new(r#"{"scope": "Widget supply", "sla_clauses": ["99.9% uptime"]}"#);
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let payload = pipeline.extract(&document(&["a"])).unwrap();

        assert_eq!(payload.taxonomy.text(Section::Scope), Some("Widget supply"));
        assert_eq!(payload.taxonomy.list(Section::SlaClauses).unwrap().len(), 1);
    }

    #[test]
    fn test_json_taxonomy_keeps_field_order() {
        let llm = MockProvider::new(
            r#"{"commercial_terms": {"Price": "10k", "Currency": "EUR", "Billing": "Monthly"}}"#,
        );
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let payload = pipeline.extract(&document(&["a"])).unwrap();

        let terms = payload.taxonomy.mapping(Section::CommercialTerms).unwrap();
        assert_eq!(terms.keys().collect::<Vec<_>>(), ["Price", "Currency", "Billing"]);
    }

    #[test]
    fn test_extract_empty_document() {
        let llm = MockProvider::default();
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        let err = pipeline.extract(&document(&[])).unwrap_err();
        assert!(matches!(err, CoreError::EmptyDocument(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_ask_uses_ranked_chunks() {
        let llm = MockProvider::new("Net 30.");
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        let doc = document(&[
            "Payment terms: due in 30 days",
            "Confidentiality clause text",
            "Late payment penalty terms",
        ]);
        let answer = pipeline.ask(&doc, "payment terms").unwrap();

        assert_eq!(answer.answer, "Net 30.");
        assert_eq!(answer.sources, vec![0, 2]);
        assert_eq!(answer.relevant_chunks, 2);
        assert!(!llm.calls()[0].user_prompt.contains("Confidentiality clause text"));
        assert!(doc.chat_log().is_empty());
    }

    #[test]
    fn test_ask_failure() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::failing("timeout"));
        let err = pipeline.ask(&document(&["a"]), "q").unwrap_err();
        assert!(matches!(err, CoreError::AskFailed { .. }));
        assert_eq!(err.stage(), "ask");
    }

    #[test]
    fn test_extract_clauses() {
        let llm = MockProvider::new(
            "```json\n{\"clauses\":[{\"type\":\"Termination\",\"text\":\"Either party may terminate.\",\"confidence\":0.9},\"junk\"]}\n```",
        );
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let clauses = pipeline.extract_clauses("Either party may terminate.").unwrap();

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].kind, "Termination");
        assert_eq!(clauses[0].confidence, 0.9);
    }

    #[test]
    fn test_extract_clauses_with_string_confidence() {
        let llm = MockProvider::new(
            r#"{"clauses":[{"type":"Termination","text":"Either party may terminate.","confidence":"0.9"}]}"#,
        );
        let pipeline = ExtractionPipeline::with_defaults(llm);
        let clauses = pipeline.extract_clauses("Either party may terminate.").unwrap();

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].kind, "Termination");
        assert_eq!(clauses[0].confidence, 0.9);
    }

    #[test]
    fn test_extract_clauses_missing_key() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::new("{\"items\": []}"));
        assert!(pipeline.extract_clauses("text").unwrap().is_empty());
    }

    #[test]
    fn test_extract_clauses_malformed() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::new("no braces here"));
        let err = pipeline.extract_clauses("text").unwrap_err();
        assert!(matches!(err, CoreError::MalformedOutput { .. }));
    }

    #[test]
    fn test_summarize_fills_missing_with_empty() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::new(
            "Summary: {\"executive\": \"Low risk.\", \"legal\": null}",
        ));
        let summaries = pipeline.summarize("text").unwrap();
        assert_eq!(summaries.executive, "Low risk.");
        assert_eq!(summaries.legal, "");
        assert_eq!(summaries.procurement, "");
    }

    #[test]
    fn test_process_rejects_blank_text() {
        let llm = MockProvider::default();
        let pipeline = ExtractionPipeline::with_defaults(llm.clone());
        let err = pipeline
            .process(&DocumentId::new("r1"), "blank.txt", "txt", "   ")
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyDocument(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[test]
    fn test_upstream_failure_in_process() {
        let pipeline = ExtractionPipeline::with_defaults(MockProvider::failing("503"));
        let err = pipeline
            .process(&DocumentId::new("r1"), "msa.txt", "txt", "text")
            .unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            chunk_overlap: 600,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            ExtractionPipeline::new(MockProvider::default(), config),
            Err(CoreError::Config(_))
        ));
    }
}
