//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use glean_core::PipelineConfig;
use glean_llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use glean_llm::OllamaProvider;
use glean_service::ServiceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model server settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Where reports are written
    #[serde(default)]
    pub output: OutputSettings,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Chunking, retrieval and extraction settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Model server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Ollama base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Seconds to wait for one HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per model call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory for `process` reports
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Chat history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(glean_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    /// Load configuration from `path`, or defaults if absent.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path()?)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.llm.base_url.trim().is_empty() {
            return Err(CliError::Config("llm.base_url must not be empty".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(CliError::Config("llm.timeout_secs must be greater than 0".into()));
        }
        if self.llm.max_attempts == 0 {
            return Err(CliError::Config("llm.max_attempts must be greater than 0".into()));
        }
        self.pipeline.validate().map_err(CliError::Config)
    }

    /// Set one value by dotted key, e.g. `llm.model` or `pipeline.top_k`.
    ///
    /// The value is parsed as the type the key already holds. List values
    /// such as `pipeline.separators` can only be edited in the file.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (table, field) = key
            .split_once('.')
            .ok_or_else(|| CliError::InvalidInput(format!("Expected <section>.<key>, got '{}'", key)))?;

        let mut root = toml::Value::try_from(&*self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        let slot = root
            .get_mut(table)
            .and_then(|t| t.get_mut(field))
            .ok_or_else(|| CliError::InvalidInput(format!("Unknown config key '{}'", key)))?;
        *slot = parse_like(slot, value).map_err(|reason| {
            CliError::InvalidInput(format!("Invalid value for '{}': {}", key, reason))
        })?;

        let updated: Config = root
            .try_into()
            .map_err(|e| CliError::InvalidInput(format!("Invalid value for '{}': {}", key, e)))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Model provider described by the `[llm]` table.
    pub fn provider(&self) -> OllamaProvider {
        OllamaProvider::new(&self.llm.base_url, &self.llm.model)
            .with_timeout(Duration::from_secs(self.llm.timeout_secs))
            .with_max_attempts(self.llm.max_attempts)
    }

    /// Service settings: pipeline plus a deadline covering every attempt.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            llm_timeout_secs: Some(
                self.llm
                    .timeout_secs
                    .saturating_mul(u64::from(self.llm.max_attempts.max(1))),
            ),
            pipeline: self.pipeline.clone(),
        }
    }
}

/// Replace `current` with `raw` parsed as the same TOML type.
fn parse_like(current: &toml::Value, raw: &str) -> std::result::Result<toml::Value, String> {
    match current {
        toml::Value::String(_) => Ok(toml::Value::String(raw.to_string())),
        toml::Value::Integer(_) => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|e| e.to_string()),
        toml::Value::Float(_) => raw
            .parse::<f64>()
            .map(toml::Value::Float)
            .map_err(|e| e.to_string()),
        toml::Value::Boolean(_) => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|e| e.to_string()),
        _ => Err("edit this key in the config file".to_string()),
    }
}

/// `~/.glean`, where the config file and chat history live.
pub fn glean_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".glean"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            output: OutputSettings::default(),
            settings: Settings::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            history_size: 1000,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_history_size() -> usize {
    1000
}
