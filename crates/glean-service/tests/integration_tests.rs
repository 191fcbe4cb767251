//! Integration tests for the document service

use glean_core::{CoreError, ExtractionPipeline, PipelineConfig};
use glean_domain::{DocumentId, LlmProvider, Section};
use glean_llm::{LlmError, MockProvider};
use glean_service::{DocumentService, InMemoryRegistry, ServiceConfig, ServiceError};
use std::time::Duration;

const CONTRACT: &str = "Payment terms: due in 30 days.\n\n\
    Confidentiality clause text applies for five years.\n\n\
    Late payment penalty terms apply at 2% per month.";

fn small_pipeline() -> ServiceConfig {
    ServiceConfig {
        llm_timeout_secs: Some(5),
        pipeline: PipelineConfig {
            chunk_size: 60,
            chunk_overlap: 10,
            ..PipelineConfig::default()
        },
    }
}

/// Helper to create a service over a mock LLM
fn create_test_service(llm: MockProvider) -> DocumentService<MockProvider, InMemoryRegistry> {
    DocumentService::from_config(llm, InMemoryRegistry::new(), &small_pipeline()).unwrap()
}

/// Provider that answers only after a delay
struct SlowProvider(Duration);

impl LlmProvider for SlowProvider {
    type Error = LlmError;

    fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, Self::Error> {
        std::thread::sleep(self.0);
        Ok("late".to_string())
    }
}

#[tokio::test]
async fn test_upload_view_and_list() {
    let service = create_test_service(MockProvider::default());

    let summary = service.upload("msa.txt", CONTRACT).await.unwrap();
    assert_eq!(summary.filename, "msa.txt");
    assert_eq!(summary.id.as_str().len(), 32);
    assert!(summary.chunk_count >= 3);

    let view = service.view(&summary.id).await.unwrap();
    assert_eq!(view.filename, "msa.txt");
    assert_eq!(view.total_chunks, summary.chunk_count);
    assert!(view.preview.len() <= 5);
    assert!(view.preview[0].starts_with("Payment terms"));

    let listed = service.list().await.unwrap();
    assert_eq!(listed, vec![summary]);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let service = create_test_service(MockProvider::default());
    let err = service.upload("msa.pptx", CONTRACT).await.unwrap_err();

    assert!(matches!(err, ServiceError::Core(CoreError::UnsupportedInput(_))));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_empty_text() {
    let service = create_test_service(MockProvider::default());
    let err = service.upload("blank.txt", "   ").await.unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::EmptyDocument(_))));
}

#[tokio::test]
async fn test_ask_records_chat_history() {
    let llm = MockProvider::new("Due in 30 days.");
    let service = create_test_service(llm.clone());
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    let answer = service.ask(&id, "payment terms").await.unwrap();
    assert_eq!(answer.answer, "Due in 30 days.");
    assert_eq!(answer.sources[0], 0);

    service.ask(&id, "confidentiality").await.unwrap();

    let history = service.chat_history(&id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].query, "payment terms");
    assert_eq!(history[1].query, "confidentiality");
    assert!(history.iter().all(|entry| entry.timestamp.is_some()));
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_extract_returns_taxonomy() {
    let llm = MockProvider::new("PENALTY CLAUSES\n2% per month on late payment");
    let service = create_test_service(llm);
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    let payload = service.extract(&id).await.unwrap();
    assert_eq!(payload.document_id, id);
    assert_eq!(payload.chunks_used, 2);
    assert_eq!(
        payload.taxonomy.list(Section::PenaltyClauses).unwrap(),
        &["2% per month on late payment".to_string()]
    );
    assert!(service.chat_history(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_document_is_not_found() {
    let service = create_test_service(MockProvider::default());
    let id = DocumentId::new("missing");

    assert!(service.view(&id).await.unwrap_err().is_not_found());
    assert!(service.ask(&id, "q").await.unwrap_err().is_not_found());
    assert!(service.extract(&id).await.unwrap_err().is_not_found());
    assert!(service.chat_history(&id).await.unwrap_err().is_not_found());
    assert!(service.delete(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_document() {
    let service = create_test_service(MockProvider::default());
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    service.delete(&id).await.unwrap();
    assert!(service.list().await.unwrap().is_empty());
    assert!(service.view(&id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_llm_failure_surfaces_with_document_id() {
    let service = create_test_service(MockProvider::failing("connection refused"));
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    match service.ask(&id, "payment").await.unwrap_err() {
        ServiceError::Core(CoreError::AskFailed { document_id, message }) => {
            assert_eq!(document_id, id.to_string());
            assert!(message.contains("connection refused"));
        }
        other => panic!("Expected AskFailed, got {:?}", other),
    }
    assert!(service.chat_history(&id).await.unwrap().is_empty());

    let err = service.extract(&id).await.unwrap_err();
    assert_eq!(err.stage(), "extract");
}

#[tokio::test]
async fn test_timeout_surfaces_as_extraction_failure() {
    let service = DocumentService::new(
        ExtractionPipeline::with_defaults(SlowProvider(Duration::from_millis(500))),
        InMemoryRegistry::new(),
        Some(Duration::from_millis(50)),
    );
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    let err = service.extract(&id).await.unwrap_err();
    match err {
        ServiceError::Core(CoreError::ExtractionFailed { message, .. }) => {
            assert!(message.contains("timed out"));
        }
        other => panic!("Expected ExtractionFailed, got {:?}", other),
    }

    let err = service.ask(&id, "payment").await.unwrap_err();
    assert!(matches!(err, ServiceError::Core(CoreError::AskFailed { .. })));
    assert!(service.chat_history(&id).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_asks_on_one_document() {
    let service = create_test_service(MockProvider::new("ok"));
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            service.ask(&id, &format!("question {}", i)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(service.chat_history(&id).await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_view_serializes() {
    let service = create_test_service(MockProvider::default());
    let id = service.upload("msa.txt", CONTRACT).await.unwrap().id;

    let view = service.view(&id).await.unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["filename"], "msa.txt");
    assert_eq!(json["id"], id.as_str());
}
