//! Glean Service
//!
//! Document registry and async document operations for serving front ends.
//! Front ends own transport; this crate owns where documents live and how
//! LLM calls are scheduled and bounded in time.

#![warn(missing_docs)]

pub mod config;
pub mod registry;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use registry::{InMemoryRegistry, RegistryError};
pub use service::{DocumentService, DocumentView};

use glean_core::CoreError;

/// Service error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Pipeline error (not found, LLM failure, unusable output, ...)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Registry failure
    #[error("Registry error: {0}")]
    Registry(String),

    /// The blocking worker panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),
}

impl ServiceError {
    /// True for lookups of unknown documents
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::NotFound(_)))
    }

    /// Stage name for user-facing reports
    pub fn stage(&self) -> &'static str {
        match self {
            ServiceError::Core(e) => e.stage(),
            ServiceError::Registry(_) => "registry",
            ServiceError::Worker(_) => "worker",
        }
    }
}
