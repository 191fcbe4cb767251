//! Configuration for the document pipeline

use serde::{Deserialize, Serialize};

/// Separators tried by the splitter, largest structural unit first.
/// The trailing empty string means "cut at character level".
pub const DEFAULT_SEPARATORS: [&str; 7] = ["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// Configuration for chunking, retrieval and extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum chunk size (characters)
    pub chunk_size: usize,

    /// Characters repeated from the end of one chunk at the start of the next
    pub chunk_overlap: usize,

    /// Separators in priority order
    pub separators: Vec<String>,

    /// Chunks returned by lexical ranking for a question
    pub top_k: usize,

    /// Chunks sampled from the head of a document for extraction
    pub max_chunks: usize,

    /// Ceiling on extraction context, in characters (tokens ≈ chars / 4)
    pub token_budget_chars: usize,

    /// Longest document text sent in a clause or summary prompt (characters)
    pub prompt_char_limit: usize,

    /// Chunks shown when previewing a document
    pub preview_chunks: usize,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        if self.separators.is_empty() {
            return Err("separators must not be empty".to_string());
        }
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.max_chunks == 0 {
            return Err("max_chunks must be greater than 0".to_string());
        }
        if self.token_budget_chars == 0 {
            return Err("token_budget_chars must be greater than 0".to_string());
        }
        if self.prompt_char_limit < 2_000 {
            return Err("prompt_char_limit must be at least 2000".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Default configuration used by every front end
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            top_k: 5,
            max_chunks: 2,
            token_budget_chars: 24_000,
            prompt_char_limit: 12_000,
            preview_chunks: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut config = PipelineConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = PipelineConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: PipelineConfig = toml::from_str("chunk_size = 800\n").unwrap();
        assert_eq!(parsed.chunk_size, 800);
        assert_eq!(parsed.chunk_overlap, 100);
        assert_eq!(parsed.separators.len(), DEFAULT_SEPARATORS.len());
    }

    #[test]
    fn test_token_estimate() {
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("abc"), 0);
    }
}
