//! Ollama Provider Implementation
//!
//! Talks to a local Ollama instance through its chat API, sending the system
//! and user prompts as two messages.
//!
//! # Examples
//!
//! ```no_run
//! use glean_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1");
//! ```

use crate::LlmError;
use glean_domain::LlmProvider;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of attempts (no retry)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Ollama API provider for local LLM inference
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
    max_attempts: u32,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from the Ollama chat API. Older servers answer with `response`.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.message
            .map(|m| m.content)
            .filter(|c| !c.is_empty())
            .or(self.response)
            .filter(|c| !c.is_empty())
    }
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Create a provider against the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of attempts per call (at least 1)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat exchange to Ollama
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - The response carries no content
    pub async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.endpoint);
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            stream: false,
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_attempts {
            debug!(model = %self.model, attempt = attempts + 1, "Sending chat request to {}", url);
            let request = self.client.post(&url).timeout(self.timeout).json(&request_body);
            match request.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let body: ChatResponse = response.json().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        return body.into_content().ok_or_else(|| {
                            LlmError::InvalidResponse("No content from Ollama response".to_string())
                        });
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_attempts {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max attempts exceeded".to_string())))
    }
}

impl LlmProvider for OllamaProvider {
    type Error = LlmError;

    /// Blocking wrapper around [`OllamaProvider::chat`].
    ///
    /// Must run off the async runtime's worker threads (for example inside
    /// `tokio::task::spawn_blocking`).
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        blocking_runtime()?.block_on(self.chat(system_prompt, user_prompt))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Process-wide runtime behind [`OllamaProvider::generate`].
///
/// It outlives every call so pooled connections stay usable between requests.
fn blocking_runtime() -> Result<&'static Runtime, LlmError> {
    static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("glean-llm")
                .enable_all()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.1");
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama3.1");
        assert_eq!(provider.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(provider.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral");
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_max_attempts_floor() {
        let provider = OllamaProvider::default_endpoint("llama3.1").with_max_attempts(0);
        assert_eq!(provider.max_attempts, 1);
    }

    #[test]
    fn test_chat_response_prefers_message_content() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"hi"},"response":"old"}"#)
                .unwrap();
        assert_eq!(body.into_content().as_deref(), Some("hi"));
    }

    #[test]
    fn test_chat_response_falls_back_to_response_field() {
        let body: ChatResponse = serde_json::from_str(r#"{"response":"legacy"}"#).unwrap();
        assert_eq!(body.into_content().as_deref(), Some("legacy"));

        let empty: ChatResponse = serde_json::from_str(r#"{"message":{"content":""}}"#).unwrap();
        assert!(empty.into_content().is_none());
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "llama3.1",
            messages: vec![
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
        assert_eq!(value["stream"], false);
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Nothing listens on port 9 (discard) in the test environment
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama3.1")
            .with_timeout(Duration::from_secs(2));

        let result = provider.chat("system", "test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[test]
    fn test_blocking_generate_reports_communication_error() {
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama3.1")
            .with_timeout(Duration::from_secs(2));
        assert!(matches!(
            provider.generate("system", "test"),
            Err(LlmError::Communication(_))
        ));
    }

    #[test]
    fn test_blocking_calls_share_one_runtime() {
        let provider = OllamaProvider::new("http://127.0.0.1:9", "llama3.1")
            .with_timeout(Duration::from_secs(2));
        let cloned = provider.clone();

        assert!(provider.generate("system", "first").is_err());
        let first = blocking_runtime().unwrap() as *const Runtime;
        assert!(cloned.generate("system", "second").is_err());
        let second = blocking_runtime().unwrap() as *const Runtime;
        assert_eq!(first, second);
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_chat_integration() {
        let provider = OllamaProvider::default_endpoint(DEFAULT_MODEL);
        if let Ok(response) = provider.chat("Answer tersely.", "Say 'hello' and nothing else").await {
            assert!(!response.is_empty());
        }
    }
}
