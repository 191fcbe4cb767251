//! Configuration file parsing for the document service.
//!
//! Loads the pipeline settings and the LLM call timeout from TOML.

use glean_core::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Service configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Seconds to wait for one LLM call; unset waits indefinitely
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: Option<u64>,

    /// Chunking, retrieval and extraction settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Default LLM timeout: 2 minutes
fn default_llm_timeout() -> Option<u64> {
    Some(120)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            llm_timeout_secs: default_llm_timeout(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "llm_timeout_secs must be greater than 0".to_string(),
            ));
        }
        self.pipeline.validate().map_err(ConfigError::Invalid)
    }

    /// LLM timeout as a duration
    pub fn llm_timeout(&self) -> Option<Duration> {
        self.llm_timeout_secs.map(Duration::from_secs)
    }
}
