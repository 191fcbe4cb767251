//! Async document operations over a registry and the extraction pipeline

use crate::config::ServiceConfig;
use crate::ServiceError;
use glean_core::{Answer, CoreError, DocumentKind, ExtractionPayload, ExtractionPipeline};
use glean_domain::{DocumentId, DocumentRegistry, DocumentSummary, LlmProvider, QaEntry};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// First chunks of a document, for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    /// Document id
    pub id: DocumentId,
    /// Original filename
    pub filename: String,
    /// Texts of the leading chunks
    pub preview: Vec<String>,
    /// Total number of chunks
    pub total_chunks: usize,
}

/// Document operations for a serving front end.
///
/// LLM calls run on the blocking thread pool. When a timeout is configured
/// and expires, the call is reported as failed; the worker thread itself is
/// left to finish in the background.
pub struct DocumentService<L, R> {
    pipeline: Arc<ExtractionPipeline<L>>,
    registry: Arc<R>,
    llm_timeout: Option<Duration>,
}

impl<L, R> Clone for DocumentService<L, R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            registry: Arc::clone(&self.registry),
            llm_timeout: self.llm_timeout,
        }
    }
}

impl<L, R> DocumentService<L, R>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
    R: DocumentRegistry + Send + Sync + 'static,
    R::Error: Display,
{
    /// Create a service from its parts
    pub fn new(pipeline: ExtractionPipeline<L>, registry: R, llm_timeout: Option<Duration>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            registry: Arc::new(registry),
            llm_timeout,
        }
    }

    /// Create a service from configuration
    pub fn from_config(llm: L, registry: R, config: &ServiceConfig) -> Result<Self, ServiceError> {
        let pipeline = ExtractionPipeline::new(llm, config.pipeline.clone())?;
        Ok(Self::new(pipeline, registry, config.llm_timeout()))
    }

    /// The underlying registry
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Chunk and register decoded document text.
    ///
    /// The filename's extension must be a supported kind.
    pub async fn upload(&self, filename: &str, text: &str) -> Result<DocumentSummary, ServiceError> {
        DocumentKind::from_path(filename)?;
        let document = self.pipeline.ingest(DocumentId::generate(), filename, text)?;
        let summary = document.summary();
        self.registry.insert(document).map_err(registry_error)?;

        info!(document_id = %summary.id, "Registered '{}'", filename);
        Ok(summary)
    }

    /// Filename, leading chunk texts and chunk count
    pub async fn view(&self, id: &DocumentId) -> Result<DocumentView, ServiceError> {
        let document = self.document(id)?;
        Ok(DocumentView {
            id: document.id().clone(),
            filename: document.filename().to_string(),
            preview: document
                .chunks()
                .iter()
                .take(self.pipeline.config().preview_chunks)
                .map(|c| c.text().to_string())
                .collect(),
            total_chunks: document.chunks().len(),
        })
    }

    /// Answer a question and record it in the document's chat log
    pub async fn ask(&self, id: &DocumentId, query: &str) -> Result<Answer, ServiceError> {
        let document = self.document(id)?;
        let question = query.to_string();

        let answer = self
            .run_blocking(move |pipeline| pipeline.ask(&document, &question))
            .await?
            .ok_or_else(|| CoreError::AskFailed {
                document_id: id.to_string(),
                message: self.timeout_message(),
            })?;

        let recorded = self
            .registry
            .append_chat(id, answer.to_entry(unix_now()))
            .map_err(registry_error)?;
        if !recorded {
            warn!(document_id = %id, "Document removed before the answer was recorded");
        }
        Ok(answer)
    }

    /// Questions and answers so far, oldest first
    pub async fn chat_history(&self, id: &DocumentId) -> Result<Vec<QaEntry>, ServiceError> {
        self.registry
            .chat_history(id)
            .map_err(registry_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Extract the taxonomy from the head of the document
    pub async fn extract(&self, id: &DocumentId) -> Result<ExtractionPayload, ServiceError> {
        let document = self.document(id)?;
        self.run_blocking(move |pipeline| pipeline.extract(&document))
            .await?
            .ok_or_else(|| {
                CoreError::ExtractionFailed {
                    document_id: id.to_string(),
                    message: self.timeout_message(),
                }
                .into()
            })
    }

    /// All registered documents
    pub async fn list(&self) -> Result<Vec<DocumentSummary>, ServiceError> {
        self.registry.list().map_err(registry_error)
    }

    /// Remove a document and its chat log
    pub async fn delete(&self, id: &DocumentId) -> Result<(), ServiceError> {
        if self.registry.remove(id).map_err(registry_error)? {
            info!(document_id = %id, "Deleted document");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    fn document(&self, id: &DocumentId) -> Result<glean_domain::Document, ServiceError> {
        self.registry
            .get(id)
            .map_err(registry_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Run `job` on the blocking pool; `None` when the timeout expired
    async fn run_blocking<T, F>(&self, job: F) -> Result<Option<T>, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&ExtractionPipeline<L>) -> Result<T, CoreError> + Send + 'static,
    {
        let pipeline = Arc::clone(&self.pipeline);
        let handle = tokio::task::spawn_blocking(move || job(&pipeline));

        let joined = match self.llm_timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("LLM call exceeded {:?}", limit);
                    return Ok(None);
                }
            },
            None => handle.await,
        };

        let result = joined.map_err(|e| ServiceError::Worker(e.to_string()))?;
        Ok(Some(result?))
    }

    fn timeout_message(&self) -> String {
        match self.llm_timeout {
            Some(limit) => format!("LLM call timed out after {:?}", limit),
            None => "LLM call timed out".to_string(),
        }
    }
}

fn not_found(id: &DocumentId) -> ServiceError {
    CoreError::NotFound(format!("document '{}'", id)).into()
}

fn registry_error<E: Display>(e: E) -> ServiceError {
    ServiceError::Registry(e.to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
