//! Glean LLM Provider Layer
//!
//! Pluggable implementations of the `LlmProvider` trait from `glean-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama chat API integration
//!
//! # Examples
//!
//! ```
//! use glean_llm::MockProvider;
//! use glean_domain::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("system", "user").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use glean_domain::LlmProvider;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A prompt pair recorded by `MockProvider`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// System prompt as sent
    pub system_prompt: String,
    /// User prompt as sent
    pub user_prompt: String,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. A
/// scripted response is chosen when its key occurs in either prompt; the
/// first registered match wins, otherwise the default response is returned.
/// Every call is recorded.
///
/// # Examples
///
/// ```
/// use glean_llm::MockProvider;
/// use glean_domain::LlmProvider;
///
/// let mut provider = MockProvider::new("fallback");
/// provider.add_response("executive", r#"{"executive":"ok"}"#);
/// assert_eq!(provider.generate("write an executive summary", "text").unwrap(), r#"{"executive":"ok"}"#);
/// assert_eq!(provider.generate("other", "text").unwrap(), "fallback");
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, Scripted)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a provider whose every call fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        let mut provider = Self::default();
        provider.add_error("", message);
        provider
    }

    /// Return `response` whenever `key` occurs in the system or user prompt
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((key.into(), Scripted::Reply(response.into())));
    }

    /// Fail whenever `key` occurs in the system or user prompt
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        lock(&self.responses).push((key.into(), Scripted::Fail(message.into())));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Prompts received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, Self::Error> {
        lock(&self.calls).push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        });

        let responses = lock(&self.responses);
        let scripted = responses
            .iter()
            .find(|(key, _)| system_prompt.contains(key.as_str()) || user_prompt.contains(key.as_str()));

        match scripted {
            Some((_, Scripted::Reply(response))) => Ok(response.clone()),
            Some((_, Scripted::Fail(message))) => Err(LlmError::Other(message.clone())),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// A panic while holding a mock lock only happens inside a failing test, so
// the data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
